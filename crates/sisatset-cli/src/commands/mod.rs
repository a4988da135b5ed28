//! CLI subcommand implementations.

pub mod children;
pub mod quick;
pub mod records;
pub mod status;
