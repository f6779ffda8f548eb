//! Stats module - descriptive statistics and rankings

mod calculator;

pub use calculator::{BoroughActivity, PriceStats, StatsCalculator, UNKNOWN_BOROUGH};
