//! neurotab CLI library.
//!
//! Configuration loading, provider construction, command execution and
//! output formatting for the `neurotab` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod provider;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use provider::build_provider;
