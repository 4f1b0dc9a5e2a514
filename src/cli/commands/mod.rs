//! Subcommand implementations

pub mod export;
pub mod inspect;
pub mod play;
pub mod train;
