//! In-memory CFP cache
//!
//! Holds the last-fetched record set for a bounded TTL window and
//! serializes refreshes so at most one upstream fetch is in flight.

mod store;

pub use store::{CfpCache, DEFAULT_TTL_MINUTES};
