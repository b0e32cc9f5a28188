pub(crate) mod fs;

// Public API - utilities used by reports and commands
pub use fs::shorten_path;
