//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `TokenStore`: durable, observable storage for the bearer token
//! - `SessionManager`: save/read/clear/validate/refresh of the session
//! - `jwt`: unverified decoding of token claims for expiry checks
//!
//! The session survives restarts; validity is judged purely from the
//! token's own structure and `exp` claim.

pub mod jwt;
pub mod manager;
pub mod store;

pub use jwt::{Claims, DecodeError};
pub use manager::SessionManager;
pub use store::TokenStore;
