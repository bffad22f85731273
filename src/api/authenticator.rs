//! Attaches the session token to outgoing requests.
//!
//! Every request built by the GraphQL client passes through here. The
//! token read is a lookup of the latest cached session value; it never
//! performs I/O, so building headers is cheap and non-blocking.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::auth::SessionManager;

use super::ApiError;

/// Non-standard header some backend deployments read instead of
/// `Authorization`
const ACCESS_TOKEN_HEADER: &str = "x-access-token";

#[derive(Clone)]
pub struct RequestAuthenticator {
    session: SessionManager,
    send_access_token_header: bool,
}

impl RequestAuthenticator {
    pub fn new(session: SessionManager, send_access_token_header: bool) -> Self {
        Self {
            session,
            send_access_token_header,
        }
    }

    /// Headers to attach to the next outgoing request.
    ///
    /// With no token stored (or an empty one) this returns an empty map
    /// and the request proceeds unauthenticated; the backend's rejection
    /// is then the caller's signal, not ours.
    pub fn auth_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();

        let token = match self.session.current_token() {
            Some(t) if !t.is_empty() => t,
            _ => {
                tracing::warn!("No token available, proceeding without authentication");
                return Ok(headers);
            }
        };

        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidToken)?;
        headers.insert(AUTHORIZATION, bearer);

        if self.send_access_token_header {
            let raw = HeaderValue::from_str(&token).map_err(|_| ApiError::InvalidToken)?;
            headers.insert(ACCESS_TOKEN_HEADER, raw);
        }

        Ok(headers)
    }
}
