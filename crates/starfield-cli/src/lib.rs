//! Starfield CLI library.
//!
//! Argument parsing helpers and result rendering shared by the
//! `starfield-cli` binary and its tests.

pub mod args;
pub mod output;
