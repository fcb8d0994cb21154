//! Chashav CLI library.
//!
//! This crate provides the command-line interface for the cycle tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, KavuahsAction, Period};
pub use config::Config;
