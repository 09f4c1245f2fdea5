//! CLI module
//!
//! Command-line interface for invoking service commands.
//!
//! # Commands
//!
//! - `invoke` - Run a command and stream its outputs
//! - `commands` - List available commands
//! - `describe` - Show one command's parameters and output
//! - `services` - List loaded services
//! - `validate` - Check a service definition file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
