//! HTTP surface for Stride.
//!
//! Thin axum handlers over `stride-core`/`stride-db`: check-ins, nudges,
//! goal CRUD, and the delivery-cycle trigger. Exposed as a library so
//! integration tests build the exact router the binary serves.

pub mod background;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
