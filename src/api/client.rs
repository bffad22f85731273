//! GraphQL client construction and caching.
//!
//! `GraphqlClient` is a thin wrapper over reqwest: it POSTs a query
//! document to the configured endpoint with auth headers attached and
//! hands back the raw response envelope. Interpreting the envelope
//! (including backend "invalid token" errors) is the call site's job;
//! the call site reacts by composing `SessionManager::clear_token` with
//! `ClientFactory::invalidate`.
//!
//! `ClientFactory` caches one client and must be invalidated on every
//! session change so no request goes out with a stale binding.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::debug;

use crate::auth::SessionManager;
use crate::config::ClientConfig;

use super::authenticator::RequestAuthenticator;
use super::ApiError;

pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: String,
    authenticator: RequestAuthenticator,
}

impl GraphqlClient {
    fn new(config: &ClientConfig, authenticator: RequestAuthenticator) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            authenticator,
        })
    }

    /// Execute a GraphQL operation and return the raw response envelope.
    ///
    /// The token in play is whatever the session holds at send time.
    /// HTTP-level failures become [`ApiError`]; GraphQL-level errors ride
    /// back inside the envelope untouched.
    pub async fn execute(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .headers(self.authenticator.auth_headers()?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        debug!(%status, "GraphQL response received");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &text));
        }

        let envelope: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        Ok(envelope)
    }
}

/// Builds and caches the client used for all backend calls.
///
/// Cloning the cached `Arc` is how call sites hold a client; after
/// [`invalidate`](ClientFactory::invalidate), the next [`client`]
/// (ClientFactory::client) call builds a fresh instance wired to the
/// current session.
pub struct ClientFactory {
    config: ClientConfig,
    session: SessionManager,
    cached: Mutex<Option<Arc<GraphqlClient>>>,
}

impl ClientFactory {
    pub fn new(config: ClientConfig, session: SessionManager) -> Self {
        Self {
            config,
            session,
            cached: Mutex::new(None),
        }
    }

    /// Cached client, built lazily on first use.
    pub fn client(&self) -> Result<Arc<GraphqlClient>, ApiError> {
        // A poisoned lock only ever guards an Option<Arc<_>>, safe to reuse
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(client) = cached.as_ref() {
            return Ok(Arc::clone(client));
        }

        debug!("Building GraphQL client");
        let authenticator = RequestAuthenticator::new(
            self.session.clone(),
            self.config.send_access_token_header,
        );
        let client = Arc::new(GraphqlClient::new(&self.config, authenticator)?);
        *cached = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Discard the cached client. Call after every sign-in, sign-out or
    /// token clear, before the operation is reported complete. In-flight
    /// requests on the old client are unaffected.
    pub fn invalidate(&self) {
        debug!("Invalidating cached GraphQL client");
        *self.cached.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenStore;

    async fn factory() -> (ClientFactory, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path().to_path_buf()).await.unwrap();
        let session = SessionManager::new(store);
        (ClientFactory::new(ClientConfig::default(), session), dir)
    }

    #[tokio::test]
    async fn client_is_cached_between_calls() {
        let (factory, _dir) = factory().await;

        let a = factory.client().unwrap();
        let b = factory.client().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn invalidate_forces_a_fresh_client() {
        let (factory, _dir) = factory().await;

        let before = factory.client().unwrap();
        factory.invalidate();
        let after = factory.client().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn cache_keeps_working_after_a_poisoned_lock() {
        let (factory, _dir) = factory().await;
        factory.client().unwrap();

        // Poison the cache lock by panicking while holding it
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = factory.cached.lock().unwrap();
            panic!("poisoning");
        }));

        assert!(factory.client().is_ok());
        factory.invalidate();
        assert!(factory.client().is_ok());
    }

    #[tokio::test]
    async fn invalidate_without_cached_client_is_harmless() {
        let (factory, _dir) = factory().await;
        factory.invalidate();
        assert!(factory.client().is_ok());
    }
}
