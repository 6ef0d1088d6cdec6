//! CLI command implementations.

pub(crate) mod about;
pub(crate) mod discover;
pub(crate) mod sync;
