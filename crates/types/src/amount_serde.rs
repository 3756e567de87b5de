//! Serde adapter for `Amount` fields.
//!
//! Amounts with 18 decimals overflow the 64-bit integers of TOML and many
//! JSON consumers, so they are written as decimal strings. Reading accepts
//! either a string or a plain integer.

use crate::units::Amount;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

pub fn serialize<S: Serializer>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
    deserializer.deserialize_any(AmountVisitor)
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(v as Amount)
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        u128::try_from(v).map_err(|_| E::custom("amount must be non-negative"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.replace('_', "")
            .parse::<Amount>()
            .map_err(|_| E::custom(format!("invalid amount: {v}")))
    }
}
