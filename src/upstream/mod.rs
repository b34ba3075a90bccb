//! Upstream Module
//!
//! The narrow contract to the PokeAPI and its reqwest implementation, plus
//! serde structs for the wire payloads the service consumes.

mod client;
pub mod types;

pub use client::{PokeApiClient, Upstream};
