//! Request middleware and extractors.

pub mod auth;

pub use auth::{CurrentPrincipal, OptionalAuth, RequireAdmin, RequireAuth};
