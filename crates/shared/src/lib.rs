//! Hostgate Shared Types and Utilities
//!
//! Tenant domain types, the error taxonomy and database helpers shared by the
//! Hostgate crates.

pub mod db;
pub mod error;
pub mod types;

pub use db::*;
pub use error::*;
pub use types::*;
