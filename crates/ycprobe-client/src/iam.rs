//! Identity token exchange.
//!
//! Posts a signed assertion to the IAM token endpoint and extracts the bearer
//! token. One request per call; no retry.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ycprobe_auth::IAM_TOKEN_URL;

use crate::error::RemoteError;
use crate::transport::HttpTransport;

/// Body of a token exchange request.
#[derive(Serialize)]
struct TokenRequest<'a> {
    jwt: &'a str,
}

/// Body of a token exchange response. Every field is optional so an
/// unexpected shape is reported as a missing token rather than a parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IamTokenResponse {
    /// The issued bearer token.
    pub iam_token: Option<String>,
    /// Token expiry as reported by the service.
    pub expires_at: Option<String>,
}

/// An issued IAM bearer token.
pub struct BearerToken {
    token: SecretString,
    expires_at: Option<String>,
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl BearerToken {
    /// The raw token.
    #[must_use]
    pub fn secret(&self) -> &SecretString {
        &self.token
    }

    /// Expiry reported by the service, if any.
    #[must_use]
    pub fn expires_at(&self) -> Option<&str> {
        self.expires_at.as_deref()
    }
}

/// Exchanges assertions for bearer tokens over an [`HttpTransport`].
#[derive(Debug)]
pub struct TokenExchangeClient<'a, T: ?Sized> {
    transport: &'a T,
}

impl<'a, T: HttpTransport + ?Sized> TokenExchangeClient<'a, T> {
    /// Create a client over `transport`.
    #[must_use]
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Build the POST request carrying `assertion`.
    pub fn build_request(assertion: &str) -> Result<http::Request<Bytes>, RemoteError> {
        let body = serde_json::to_vec(&TokenRequest { jwt: assertion })
            .map_err(|e| RemoteError::InvalidRequest(e.to_string()))?;

        http::Request::builder()
            .method(http::Method::POST)
            .uri(IAM_TOKEN_URL)
            .header(CONTENT_TYPE, "application/json")
            .body(Bytes::from(body))
            .map_err(|e| RemoteError::InvalidRequest(e.to_string()))
    }

    /// Exchange `assertion` for a bearer token.
    pub async fn exchange(&self, assertion: &str) -> Result<BearerToken, RemoteError> {
        let request = Self::build_request(assertion)?;
        let response = self.transport.send(request).await?;
        let status = response.status;

        if !status.is_success() {
            warn!("token exchange rejected");
            debug!(status = status.as_u16(), "token exchange status");
            return Err(RemoteError::Status {
                status,
                body: response.body_text(),
            });
        }

        let parsed: IamTokenResponse = serde_json::from_slice(&response.body).unwrap_or_else(|e| {
            debug!(error = %e, "token response is not the expected JSON");
            IamTokenResponse::default()
        });

        match parsed.iam_token.filter(|t| !t.is_empty()) {
            Some(token) => Ok(BearerToken {
                token: SecretString::from(token),
                expires_at: parsed.expires_at,
            }),
            None => {
                warn!("token response has no iamToken");
                Err(RemoteError::MissingField {
                    field: "iamToken",
                    status,
                    body: response.body_text(),
                })
            }
        }
    }
}
