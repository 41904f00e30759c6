//! CLI command handling module
//!
//! Subcommand definitions, their handlers, and logging setup.

mod commands;
mod logging;

pub use commands::{ConfigSubcommand, ToolCommand, handle_config_command, run_tool};
pub use logging::init_logging;
