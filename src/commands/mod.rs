//! Command handlers invoked by the `mira` binary

pub mod sync;
