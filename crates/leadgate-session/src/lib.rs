//! Client-side session handling for the admin dashboard.
//!
//! [`AuthSession`] wraps a cookie-carrying HTTP client pointed at the auth
//! service and keeps the current admin identity in memory — nothing is ever
//! written to disk. A background task refreshes the access token while a
//! session exists.

pub mod guard;
pub mod session;

pub use guard::RouteGuard;
pub use session::{AdminIdentity, AuthSession, SessionError};
