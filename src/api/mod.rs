//! GraphQL API client module.
//!
//! This module provides the authenticated client used for all backend
//! calls. The backend exposes a single POST endpoint accepting a query
//! document; authentication is a JWT bearer token attached per-request
//! by `RequestAuthenticator`, and `ClientFactory` keeps the cached
//! client in lockstep with the session.

pub mod authenticator;
pub mod client;
pub mod error;

pub use authenticator::RequestAuthenticator;
pub use client::{ClientFactory, GraphqlClient};
pub use error::ApiError;
