//! # heston-termstructures
//!
//! Day-count conventions, discount curves, and the [`MarketContext`]
//! snapshot (spot, valuation date, discount and dividend curves) that every
//! pricing call receives explicitly.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod day_counter;
pub mod flat_forward;
pub mod market_context;
pub mod yield_term_structure;

pub use day_counter::{Actual365Fixed, DayCounter};
pub use flat_forward::FlatForward;
pub use market_context::MarketContext;
pub use yield_term_structure::YieldTermStructure;
