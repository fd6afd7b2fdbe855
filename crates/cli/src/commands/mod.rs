//! CLI command implementations.

pub mod chain;
pub mod evidence;
pub mod interactions;
