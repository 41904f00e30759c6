//! Logging initialization

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Initialize logging
///
/// With `debug`, everything at debug level goes to a temp file whose path is
/// returned. Otherwise logs go to stderr at `level`; `RUST_LOG` overrides
/// either default.
pub fn init_logging(debug: bool, level: &str) -> Option<PathBuf> {
    if debug {
        let temp_file = tempfile::Builder::new()
            .prefix("rancher-inspect-")
            .suffix(".log")
            .tempfile()
            .and_then(|f| f.keep().map_err(|e| e.error))
            .map(|(_, path)| path)
            .unwrap_or_else(|_| {
                std::env::temp_dir().join(format!("rancher-inspect-{}.log", std::process::id()))
            });

        let file = match std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&temp_file)
        {
            Ok(file) => file,
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", temp_file.display(), e);
                init_stderr("debug");
                return None;
            }
        };

        tracing_subscriber::fmt()
            .with_writer(file)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_ansi(false) // No ANSI codes in log file
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .init();

        Some(temp_file)
    } else {
        init_stderr(level);
        None
    }
}

fn init_stderr(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .init();
}
