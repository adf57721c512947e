//! CLI command implementations.

pub mod common;
pub mod deconvolve;
pub mod generate;
pub mod info;
pub mod simulate;
