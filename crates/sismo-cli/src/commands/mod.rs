//! CLI command implementations.

pub mod common;
pub mod convert;
pub mod generate;
pub mod info;
pub mod plot;
