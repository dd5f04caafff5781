//! Signed JWT assertions for the Yandex Cloud IAM token exchange.
//!
//! A service account proves possession of its authorized key by signing a
//! short-lived assertion with `PS256`:
//!
//! ```text
//! header: { "alg": "PS256", "typ": "JWT", "kid": <public key id> }
//! claims: { "iss": <service account id>, "sub": <service account id>,
//!           "aud": "https://iam.api.cloud.yandex.net/iam/v1/tokens",
//!           "iat": <now>, "exp": <now + 3600> }
//! ```
//!
//! Each assertion is minted for a single exchange and never reused.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::AssertionError;

/// IAM token endpoint; also the assertion audience.
pub const IAM_TOKEN_URL: &str = "https://iam.api.cloud.yandex.net/iam/v1/tokens";

/// Lifetime of an assertion in seconds.
pub const ASSERTION_TTL_SECS: u64 = 3600;

/// Signing algorithm required by the IAM service.
pub const ASSERTION_ALGORITHM: Algorithm = Algorithm::PS256;

/// Registered claims carried by an assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Issuer: the service account.
    pub iss: String,
    /// Subject: the service account.
    pub sub: String,
    /// Audience: the IAM token endpoint.
    pub aud: String,
    /// Issued-at, unix seconds.
    pub iat: u64,
    /// Expiry, unix seconds.
    pub exp: u64,
}

/// Builds assertions for one service account key.
///
/// # Examples
///
/// ```no_run
/// use chrono::Utc;
/// use secrecy::SecretString;
/// use ycprobe_auth::jwt::AssertionBuilder;
///
/// let pem = SecretString::from(std::fs::read_to_string("key.pem").unwrap());
/// let builder = AssertionBuilder::new("aje-service-account", "aje-key-id", &pem);
/// let jwt = builder.build(Utc::now()).unwrap();
/// assert_eq!(jwt.split('.').count(), 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AssertionBuilder<'a> {
    service_account_id: &'a str,
    public_key_id: &'a str,
    private_key_pem: &'a SecretString,
}

impl<'a> AssertionBuilder<'a> {
    /// Create a builder for the given service account key.
    #[must_use]
    pub fn new(
        service_account_id: &'a str,
        public_key_id: &'a str,
        private_key_pem: &'a SecretString,
    ) -> Self {
        Self {
            service_account_id,
            public_key_id,
            private_key_pem,
        }
    }

    /// Claims for an assertion issued at `issued_at`.
    pub fn claims(&self, issued_at: DateTime<Utc>) -> Result<AssertionClaims, AssertionError> {
        let iat = u64::try_from(issued_at.timestamp())
            .map_err(|_| AssertionError::InvalidIssueTime(issued_at.timestamp()))?;

        Ok(AssertionClaims {
            iss: self.service_account_id.to_owned(),
            sub: self.service_account_id.to_owned(),
            aud: IAM_TOKEN_URL.to_owned(),
            iat,
            exp: iat + ASSERTION_TTL_SECS,
        })
    }

    /// The JOSE header: `PS256`, `JWT`, and the key id.
    #[must_use]
    pub fn header(&self) -> Header {
        let mut header = Header::new(ASSERTION_ALGORITHM);
        header.kid = Some(self.public_key_id.to_owned());
        header
    }

    /// Sign a compact `header.claims.signature` assertion.
    pub fn build(&self, issued_at: DateTime<Utc>) -> Result<String, AssertionError> {
        let claims = self.claims(issued_at)?;
        let key = EncodingKey::from_rsa_pem(self.private_key_pem.expose_secret().as_bytes())
            .map_err(AssertionError::InvalidKey)?;

        jsonwebtoken::encode(&self.header(), &claims, &key).map_err(AssertionError::Signing)
    }
}
