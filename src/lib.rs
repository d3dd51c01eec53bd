//! cfpwatch library
//!
//! This module exposes the cache, CLI, data, and query modules for use
//! in integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod query;
