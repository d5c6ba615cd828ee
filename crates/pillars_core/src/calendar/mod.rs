//! Date-aware derivations over score history.
//!
//! # Responsibility
//! - Normalize stored dates into local day keys (`day`).
//! - Derive averages, trends and chart windows (`trend`).
//! - Lay out the monthly heat-map (`grid`).
//!
//! # Invariants
//! - Derivations are pure and take "today" as input; only `LocalClock`
//!   reads the system time.

pub mod day;
pub mod grid;
pub mod trend;
