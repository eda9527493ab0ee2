//! Subcommands of the `grapple` binary

pub mod inspect;
pub mod train;
