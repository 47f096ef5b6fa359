//! Domain model.

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartItem};
pub use order::{Order, OrderItem, OrderStatus};
pub use product::{ProductSnapshot, StockLevel};
