//! Operators that combine the children of a pool list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PoolError;

/// A binary integer operation applied left to right across a list's children.
///
/// Serializes as its symbol (`+`, `-`, `*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operation {
    /// Addition, the default operation.
    #[default]
    Add,
    /// Subtraction.
    Subtract,
    /// Multiplication.
    Multiply,
}

impl Operation {
    /// Every selectable operation, in menu order.
    pub const ALL: [Operation; 3] = [Self::Add, Self::Subtract, Self::Multiply];

    /// The operator symbol shown between terms.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
        }
    }

    /// Human readable name of the operation.
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "plus",
            Self::Subtract => "minus",
            Self::Multiply => "multiply",
        }
    }

    /// Apply the operation to two totals. Overflow wraps.
    pub fn apply(self, x: i32, y: i32) -> i32 {
        match self {
            Self::Add => x.wrapping_add(y),
            Self::Subtract => x.wrapping_sub(y),
            Self::Multiply => x.wrapping_mul(y),
        }
    }

    /// Look up an operation by its symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operation {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s.trim())
            .ok_or_else(|| PoolError::CorruptData(format!("unknown operation \"{s}\"")))
    }
}

impl TryFrom<String> for Operation {
    type Error = PoolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Operation> for String {
    fn from(op: Operation) -> Self {
        op.symbol().to_string()
    }
}
