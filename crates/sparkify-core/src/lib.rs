//! Core data model for sparkify.
//!
//! This crate defines the raw record families read from the input tree
//! (catalog and event records), the row types of the five analytical
//! tables, and their columnar (Arrow) schemas.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod schema;

pub use error::{Error, Result};
