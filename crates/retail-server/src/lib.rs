//! Retail Ops server library.
//!
//! Command-line parsing and the commands behind the `retail-server` binary.

pub mod cli;
pub mod commands;
