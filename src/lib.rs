//! Authentication and session core for the Stayfinder travel client.
//!
//! This crate owns the client's authentication state: it persists the
//! bearer token issued by the GraphQL backend, decides whether that token
//! is still usable, and keeps the HTTP client in sync with the session so
//! that requests never go out with stale credentials.
//!
//! The pieces compose bottom-up:
//! - [`auth::TokenStore`]: durable, observable storage for the token
//! - [`auth::SessionManager`]: save/read/clear/validate/refresh
//! - [`api::RequestAuthenticator`]: attaches the token to outgoing calls
//! - [`api::ClientFactory`]: caches the GraphQL client, rebuilt on demand
//!   after any session change
//!
//! There is no singleton: construct one [`auth::SessionManager`] at startup
//! and hand clones to everything that needs it.
//!
//! ```no_run
//! use stayfinder_auth::auth::{SessionManager, TokenStore};
//! use stayfinder_auth::api::ClientFactory;
//! use stayfinder_auth::config::ClientConfig;
//!
//! # async fn wire() -> anyhow::Result<()> {
//! let config = ClientConfig::load()?;
//! let store = TokenStore::open(config.data_dir()?).await?;
//! let session = SessionManager::new(store);
//! let factory = ClientFactory::new(config, session.clone());
//!
//! session.save_token("eyJ...").await?;
//! factory.invalidate();
//! let client = factory.client()?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;

pub use api::{ApiError, ClientFactory, GraphqlClient, RequestAuthenticator};
pub use auth::{Claims, DecodeError, SessionManager, TokenStore};
pub use config::ClientConfig;
