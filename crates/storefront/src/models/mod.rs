//! Domain models for the storefront.

pub mod auth_state;
pub mod card;
pub mod session;

pub use auth_state::{AuthState, SessionKind};
pub use card::SavedCard;
pub use session::{SESSION_COOKIE_NAME, Session, SessionToken};
