//! ABC importance tiers.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Importance tier assigned to an item by a classifier.
///
/// - `A`: high priority
/// - `B`: medium priority
/// - `C`: low priority
///
/// Items that have not been classified yet carry `Option::<AbcCategory>::None`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AbcCategory {
    A,
    B,
    C,
}

impl AbcCategory {
    /// All tiers in indicator-column order.
    pub const ALL: [AbcCategory; 3] = [AbcCategory::A, AbcCategory::B, AbcCategory::C];

    /// Position of this tier's indicator column (A=0, B=1, C=2).
    pub fn index(self) -> usize {
        match self {
            AbcCategory::A => 0,
            AbcCategory::B => 1,
            AbcCategory::C => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AbcCategory::A => "A",
            AbcCategory::B => "B",
            AbcCategory::C => "C",
        }
    }
}

impl ValueObject for AbcCategory {}

impl core::fmt::Display for AbcCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AbcCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(AbcCategory::A),
            "B" => Ok(AbcCategory::B),
            "C" => Ok(AbcCategory::C),
            other => Err(DomainError::parse(format!(
                "ABC category must be one of A, B, C (got {other:?})"
            ))),
        }
    }
}
