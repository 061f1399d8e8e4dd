//! Bookshop Application Library
//!
//! This library provides the application modules and utilities for the
//! bookshop service: the seeded book catalog, the user registry, and the
//! per-user review ledger, each exposed as an HTTP module.

pub mod modules;
pub mod utils;

/// Re-export commonly used types
pub use modules::*;
