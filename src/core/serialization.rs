//! Wire encoding of cell states: `1` black, `-1` white, `0` empty.

use super::types::CellState;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

impl CellState {
    pub fn to_wire(self) -> i8 {
        match self {
            CellState::Empty => 0,
            CellState::Black => 1,
            CellState::White => -1,
        }
    }

    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(CellState::Empty),
            1 => Some(CellState::Black),
            -1 => Some(CellState::White),
            _ => None,
        }
    }
}

impl Serialize for CellState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i8(self.to_wire())
    }
}

struct CellStateVisitor;

impl<'de> Visitor<'de> for CellStateVisitor {
    type Value = CellState;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("one of 1, -1, 0")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<CellState, E> {
        CellState::from_wire(v).ok_or_else(|| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<CellState, E> {
        match i64::try_from(v) {
            Ok(v) => self.visit_i64(v),
            Err(_) => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
        }
    }
}

impl<'de> Deserialize<'de> for CellState {
    fn deserialize<D>(deserializer: D) -> Result<CellState, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_i64(CellStateVisitor)
    }
}
