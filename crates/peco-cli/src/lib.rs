//! Command-line front end for the peco build plan compiler.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - `plan`, `sw` and `serve`
//! - [`dev`] - development server pieces
//! - [`error`] - CLI errors and their miette rendering
//! - [`logger`] / [`ui`] - tracing setup and status lines

pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
