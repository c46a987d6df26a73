// Command handlers module
pub mod check;
pub mod version;

// Re-exports for cleaner imports
pub use check::execute as check;
pub use version::execute as version;
