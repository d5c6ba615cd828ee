//! Domain model for pillars, daily scores, reflections and diary pages.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation of user-entered values (scores, required text) close to
//!   the types that carry them.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that survives updates.
//! - Dates are local calendar days (`NaiveDate`), never instants.

pub mod diary;
pub mod entry;
pub mod pillar;
pub mod reflection;
pub mod view_state;
