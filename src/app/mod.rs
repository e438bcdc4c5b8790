//! Application module

pub mod cli;
pub mod desk;
pub mod startup;
