// Internal modules - not part of public API
pub(crate) mod config;
pub(crate) mod driver;
pub(crate) mod engine;
pub(crate) mod layout;
pub(crate) mod outcome;
pub(crate) mod report;
pub(crate) mod state;

// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
