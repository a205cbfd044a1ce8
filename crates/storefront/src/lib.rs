//! Rahat Pay storefront client library.
//!
//! A typed client for the storefront backend: session and token handling,
//! cart, coupon pricing, checkout, wallet, mobile top-up, and a cached view
//! of the catalog. [`state::Storefront`] wires all of it over one backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod coupon;
pub mod error;
pub mod i18n;
pub mod media;
pub mod models;
pub mod pricing;
pub mod session;
pub mod state;
pub mod storage;
pub mod tenant;
pub mod topup;
pub mod wallet;

pub use error::{ErrorCategory, StorefrontError};
pub use state::Storefront;
