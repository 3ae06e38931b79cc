//! Models module for the SDK
//!
//! Defines the canonical schema every producer (DDL parser, catalog reader,
//! JSON input) normalizes into and every consumer renders from.

pub mod column;
pub mod table;

pub use column::Column;
pub use table::{PARSE_FAILURE_MESSAGE, PARSE_SUCCESS_MESSAGE, TableSchema};
