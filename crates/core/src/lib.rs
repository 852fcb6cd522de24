//! Giftwell Core - Shared types library.
//!
//! This crate provides common types used across all Giftwell components:
//! - `storefront` - Customer-facing gift card storefront service
//! - `integration-tests` - Scenario tests against in-process fake upstreams
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money amounts, emails,
//!   and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
