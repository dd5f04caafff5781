//! Credential proofs for Yandex Cloud.
//!
//! This crate produces the two proofs ycprobe presents to the remote
//! services, without doing any I/O:
//!
//! - a `PS256`-signed JWT assertion for the IAM token exchange, built from a
//!   service account's authorized key, and
//! - AWS Signature Version 4 headers for an object storage request, built
//!   from a static access key pair.
//!
//! # Usage
//!
//! ```rust
//! use secrecy::SecretString;
//! use ycprobe_auth::sigv4::{AmzDate, SigV4Signer};
//!
//! let secret = SecretString::from("secret");
//! let date = AmzDate::parse("20150830T123600Z").unwrap();
//! let headers = SigV4Signer::new("AKID", &secret).sign_get("storage.yandexcloud.net", &date);
//! assert_eq!(headers.amz_date, "20150830T123600Z");
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical request construction
//! - [`error`] - Error types
//! - [`jwt`] - JWT assertion builder
//! - [`sigv4`] - Signing key derivation and request signing

pub mod canonical;
pub mod error;
pub mod jwt;
pub mod sigv4;

pub use error::{AmzDateError, AssertionError};
pub use jwt::{AssertionBuilder, AssertionClaims, IAM_TOKEN_URL};
pub use sigv4::{AmzDate, SigV4Signer, SignedHeaderSet, hash_payload};
