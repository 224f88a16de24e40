//! Pure domain logic for the Stride habit tracker.
//!
//! This crate has zero internal deps and performs no I/O. It holds the
//! civil-day clock, the streak state machine, and the subscription quota
//! policy, so the persistence and HTTP layers never re-implement (or
//! disagree about) any of these rules.

pub mod civil;
pub mod error;
pub mod quota;
pub mod streak;
pub mod types;
