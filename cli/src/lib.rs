//! `crm` command-line front end.
//!
//! Wires configuration, the HTTP record client, the repository and the
//! pipeline together. Output goes to the writer passed in; logs go through
//! `tracing`.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod output;

pub use cli::Cli;
pub use commands::{execute, run};
pub use config::CrmConfig;
pub use errors::{CliError, ConfigError};
