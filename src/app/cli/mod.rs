//! CLI module containing argument parsing, configuration and table output

pub mod args;
pub mod config;
pub mod display;
