//! SiSatSet CLI library.
//!
//! This crate provides the command-line shell around the quick-input engine.

mod cli;
pub mod commands;
mod config;
pub mod refresh;

pub use cli::{ChildrenAction, Cli, Commands};
pub use config::Config;
