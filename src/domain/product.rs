//! Product snapshots as read from the catalog.

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Read-only view of a catalog product at a point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: StockLevel,
}

/// Available stock for a product.
///
/// A stock field that is absent, negative, or not a valid non-negative
/// number maps to `Unbounded`: catalog entries without explicit stock never
/// block purchases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StockLevel {
    Bounded(i64),
    #[default]
    Unbounded,
}

impl StockLevel {
    /// Maps a raw stock value (e.g. a nullable column) onto the sentinel.
    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            Some(n) if n >= 0 => Self::Bounded(n),
            _ => Self::Unbounded,
        }
    }

    pub fn as_raw(&self) -> Option<i64> {
        match self {
            Self::Bounded(n) => Some(*n),
            Self::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Whether a reservation of `qty` units could be satisfied right now.
    pub fn covers(&self, qty: u32) -> bool {
        match self {
            Self::Bounded(n) => *n >= i64::from(qty),
            Self::Unbounded => true,
        }
    }
}

impl Serialize for StockLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_raw().serialize(serializer)
    }
}

struct RawStock;

impl<'de> Visitor<'de> for RawStock {
    type Value = StockLevel;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a stock count, null, or any non-numeric value")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<StockLevel, E> {
        Ok(StockLevel::from_raw(Some(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<StockLevel, E> {
        Ok(i64::try_from(v).map_or(StockLevel::Unbounded, StockLevel::Bounded))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<StockLevel, E> {
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= i64::MAX as f64 {
            Ok(StockLevel::Bounded(v as i64))
        } else {
            Ok(StockLevel::Unbounded)
        }
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<StockLevel, E> {
        Ok(StockLevel::Unbounded)
    }

    fn visit_str<E: de::Error>(self, _v: &str) -> Result<StockLevel, E> {
        Ok(StockLevel::Unbounded)
    }

    fn visit_unit<E: de::Error>(self) -> Result<StockLevel, E> {
        Ok(StockLevel::Unbounded)
    }

    fn visit_none<E: de::Error>(self) -> Result<StockLevel, E> {
        Ok(StockLevel::Unbounded)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<StockLevel, D::Error> {
        d.deserialize_any(RawStock)
    }
}

impl<'de> Deserialize<'de> for StockLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawStock)
    }
}
