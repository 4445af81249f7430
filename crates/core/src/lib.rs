//! Domain models and the multi-tier reconciliation engine for the photography portfolio.

pub mod config;
pub mod errors;
pub mod portfolio;
pub mod sync;

pub use errors::{DatabaseError, Error, Result};
