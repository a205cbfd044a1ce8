//! Rahat Core - Shared types library.
//!
//! This crate provides the domain types used by the storefront client and the
//! command-line tools:
//! - `storefront` - Backend client, session, cart, and checkout pipeline
//! - `cli` - Operator tooling built on the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no persisted state. All money arithmetic is done in USD with
//! [`rust_decimal::Decimal`]; other currencies exist only for display.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, money and currency, emails, languages, statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
