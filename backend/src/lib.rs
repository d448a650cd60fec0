//! Greenlight movie API library.
//!
//! The crate is laid out as a small hexagon: [`domain`] holds the movie
//! model, its scalar types, and the validation accumulator; [`inbound`] holds
//! the Actix Web adapter with the strict JSON codec and envelope writer; and
//! [`middleware`] holds request-scoped tracing.

pub mod domain;
pub mod inbound;
pub mod middleware;
