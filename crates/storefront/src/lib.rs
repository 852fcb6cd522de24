//! Giftwell Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod backend;
pub mod cache;
pub mod cards;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod square;
pub mod state;
