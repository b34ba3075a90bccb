//! Service Module
//!
//! The aggregation façade combining cache, coalescer, batch fetcher, and
//! upstream client to answer list / detail / by-type queries.

mod pokemon;

pub use pokemon::PokemonService;
