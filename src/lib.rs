// esxprobe library - public API

// Re-export error types
pub mod error;
pub use error::{ProbeError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use crate::core::config::ProbeConfig;

// Initialize logging on stderr; --verbose raises the level to debug
// unless RUST_LOG sets the filter
pub fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_none() {
        builder.filter_level(log_level(verbose));
    }
    let _ = builder.target(env_logger::Target::Stderr).try_init();
}

fn log_level(verbose: bool) -> log::LevelFilter {
    if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    }
}
