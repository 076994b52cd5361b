//! bunkmeter-core — attendance statistics and sheet handling.
//!
//! This crate defines the data model, the bunk-budget engine, and the
//! sheet/import/report plumbing that the rest of bunkmeter builds on.

pub mod error;
pub mod import;
pub mod model;
pub mod parser;
pub mod report;
pub mod sheet;
pub mod statistics;
pub mod traits;
