//! Subcommand implementations.
//!
//! Results go to stdout; logs go to stderr so output can be piped.

pub mod auth;
pub mod catalog;
pub mod shop;
pub mod topup;
pub mod wallet;
