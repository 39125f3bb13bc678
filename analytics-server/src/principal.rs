//! Principal extraction
//!
//! Authentication is the hosting platform's responsibility: a fronting
//! gateway authenticates the user and injects the principal name into a
//! trusted header (configurable, default `x-forwarded-user`). Requests
//! without the header are anonymous.

use crate::error::ServerError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;

/// Principal resolved from the gateway header, if any
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<String>);

impl MaybePrincipal {
    /// Principal name, or `None` for anonymous requesters
    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Require an authenticated principal, 401 otherwise
    pub fn require(&self) -> Result<&str, ServerError> {
        self.name()
            .ok_or_else(|| ServerError::unauthorized("Authentication required"))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybePrincipal {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let name = parts
            .headers
            .get(&state.config.principal_header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(MaybePrincipal(name))
    }
}
