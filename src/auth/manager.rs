//! Session manager: the authoritative authentication API.
//!
//! Everything else in the client goes through [`SessionManager`] to read
//! or change authentication state. It composes the durable token store
//! with the JWT decoder to answer "are we signed in" and "is the token
//! still usable" without ever surfacing expected conditions (missing,
//! expired, malformed token) as errors.
//!
//! Construct exactly one per process and pass clones around; clones share
//! the same underlying store.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use futures::Stream;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::jwt;
use super::store::TokenStore;

/// How many characters of a token to include in debug logs
const TOKEN_PREVIEW_CHARS: usize = 10;

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<TokenStore>,
}

impl SessionManager {
    pub fn new(store: TokenStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Persist a freshly issued token. The token is stored as-is; format
    /// validation is a separate concern of [`Self::is_token_valid`].
    pub async fn save_token(&self, token: &str) -> Result<()> {
        anyhow::ensure!(!token.is_empty(), "Refusing to save an empty token");
        debug!(preview = %preview(token), chars = token.len(), "Saving token");
        self.store.save(token).await
    }

    /// Sign out: remove the persisted token.
    pub async fn clear_token(&self) -> Result<()> {
        debug!("Clearing token");
        self.store.clear().await
    }

    /// Latest committed token, `None` when signed out.
    pub fn current_token(&self) -> Option<String> {
        self.store.current()
    }

    /// Watch the token value. The receiver holds the current value
    /// immediately and observes every later save/clear in commit order.
    pub fn token_stream(&self) -> watch::Receiver<Option<String>> {
        self.store.subscribe()
    }

    /// Whether a non-empty token is currently stored. Says nothing about
    /// whether the backend would still accept it.
    pub fn is_authenticated(&self) -> bool {
        is_present(&self.current_token())
    }

    /// Stream of [`Self::is_authenticated`], re-evaluated on every token
    /// change. Emits the current value first.
    pub fn authenticated_stream(&self) -> impl Stream<Item = bool> {
        let rx = self.store.subscribe();
        futures::stream::unfold((rx, true), |(mut rx, first)| async move {
            if first {
                let value = is_present(&rx.borrow());
                return Some((value, (rx, false)));
            }
            match rx.changed().await {
                Ok(()) => {
                    let value = is_present(&rx.borrow());
                    Some((value, (rx, false)))
                }
                Err(_) => None,
            }
        })
    }

    /// Whether the stored token is well-formed and not past its own
    /// stated expiry. No signature check is performed, so `true` must not
    /// be read as "the backend will accept this token".
    pub fn is_token_valid(&self) -> bool {
        let Some(token) = self.current_token() else {
            return false;
        };
        debug!(preview = %preview(&token), chars = token.len(), "Validating token");

        match jwt::decode(&token) {
            Ok(claims) => {
                if claims.is_expired(Utc::now().timestamp()) {
                    warn!("Token is expired");
                    false
                } else {
                    true
                }
            }
            Err(e) => {
                warn!(error = %e, "Token failed to decode");
                false
            }
        }
    }

    /// Attempt to exchange the current token for a fresh one.
    ///
    /// The backend offers no refresh endpoint, so this always returns
    /// `false` and leaves the stored token untouched. Callers must treat
    /// `false` as "refresh unavailable", not a transient failure.
    pub async fn refresh_token(&self) -> bool {
        debug!("Token refresh attempted but not supported by the backend");
        false
    }
}

fn is_present(token: &Option<String>) -> bool {
    token.as_deref().is_some_and(|t| !t.is_empty())
}

fn preview(token: &str) -> String {
    if token.chars().count() > TOKEN_PREVIEW_CHARS {
        let head: String = token.chars().take(TOKEN_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        token.to_string()
    }
}
