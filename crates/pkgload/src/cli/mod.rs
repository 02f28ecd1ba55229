//! CLI command implementations.

mod display;

pub mod load;
pub mod parse;
