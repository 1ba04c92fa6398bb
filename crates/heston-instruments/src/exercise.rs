//! Exercise style.
//!
//! Pricers match on [`Exercise`] exhaustively, so adding a style is a
//! compile-time prompt to handle it everywhere.

use std::fmt;

/// When an option can be exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Exercise {
    /// Only at expiry.
    #[default]
    European,
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exercise::European => write!(f, "European"),
        }
    }
}
