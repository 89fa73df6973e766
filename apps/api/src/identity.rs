/// Caller identity and the identity-provider seam.
///
/// ARCHITECTURAL RULE: every operation receives an explicit, immutable
/// `Identity` resolved from the request's bearer token. No handler reads
/// identity from shared state, and no `OwnerId` is ever accepted from a
/// client-controlled payload field.
use std::fmt;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

const IDENTITY_HTTP_TIMEOUT_SECS: u64 = 10;

/// Opaque identifier for an authenticated owner, issued by the identity
/// provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub Uuid);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Verified caller identity, extracted once per request.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub owner: OwnerId,
}

/// External identity provider. Session issuance and password flows live
/// entirely on the provider side; this crate only verifies tokens and, during
/// account deletion Phase 2, asks the provider to remove an identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves a bearer token to the owner it authenticates.
    async fn authenticate(&self, access_token: &str) -> Result<OwnerId, AppError>;

    /// Permanently removes the identity. Invoked only after all owner data
    /// has been deleted.
    async fn delete_identity(&self, owner: OwnerId) -> Result<(), AppError>;
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?.to_string();
        let owner = state.identity.authenticate(&token).await?;
        Ok(Identity { owner })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// GoTrue-style identity provider client.
pub struct GoTrueProvider {
    client: Client,
    base_url: String,
    service_role_key: String,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: Uuid,
}

impl GoTrueProvider {
    pub fn new(base_url: String, service_role_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(IDENTITY_HTTP_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_role_key,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoTrueProvider {
    async fn authenticate(&self, access_token: &str) -> Result<OwnerId, AppError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.service_role_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("identity provider unreachable: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AppError::Unauthorized);
        }
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "identity provider returned {status}"
            )));
        }

        let user: GoTrueUser = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("malformed identity response: {e}")))?;
        Ok(OwnerId(user.id))
    }

    async fn delete_identity(&self, owner: OwnerId) -> Result<(), AppError> {
        let response = self
            .client
            .delete(format!("{}/auth/v1/admin/users/{owner}", self.base_url))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("identity provider unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "identity removal returned {status}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: &str) -> Parts {
        let request = Request::builder()
            .header(AUTHORIZATION, value)
            .body(())
            .unwrap();
        request.into_parts().0
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth("Bearer abc123");
        assert_eq!(bearer_token(&parts), Some("abc123"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        let parts = parts_with_auth("Basic abc123");
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let request = Request::builder().body(()).unwrap();
        let (parts, _) = request.into_parts();
        assert_eq!(bearer_token(&parts), None);
    }
}
