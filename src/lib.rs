//! NYC Stays - Airbnb listing analysis for New York City
//!
//! Loads an Inside Airbnb listings snapshot, bins listings into a coarse
//! latitude/longitude grid, prices each listing relative to its cell and hands
//! chart tables to a visualization surface.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod pages;
pub mod spatial;
pub mod stats;
