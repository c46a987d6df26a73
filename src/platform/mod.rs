// Platform-specific code module

pub mod alarm;

// Re-exports para imports limpios
pub use alarm::{cancel_timeout, install_timeout};
