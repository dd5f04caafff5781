//! Remote credential validation for Yandex Cloud.
//!
//! [`Validator`] exercises one [`CredentialSet`](ycprobe_core::CredentialSet)
//! against both remote protocols in sequence:
//!
//! 1. a `PS256` JWT assertion is exchanged for an IAM token at
//!    `https://iam.api.cloud.yandex.net/iam/v1/tokens`, then
//! 2. a SigV4-signed `GET /` lists buckets at `https://storage.yandexcloud.net/`.
//!
//! All HTTP goes through the [`HttpTransport`] trait; [`ReqwestTransport`] is
//! the production implementation.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tokio_util::sync::CancellationToken;
//! use ycprobe_client::{ReqwestTransport, Validator};
//! use ycprobe_core::{CredentialSet, ProbeConfig};
//!
//! # async fn run(credentials: CredentialSet) -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ReqwestTransport::new(&ProbeConfig::from_env())?;
//! let validator = Validator::new(transport);
//! match validator.validate(&credentials, &CancellationToken::new()).await {
//!     Ok(report) => println!("{} passed", report.display_name),
//!     Err(failure) => println!("failed: {}", failure.error.user_message()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod iam;
pub mod storage;
pub mod transport;
pub mod validator;

pub use error::{
    CredentialFormatError, ErrorKind, RemoteError, ValidationError, ValidationFailure,
};
pub use iam::{BearerToken, IamTokenResponse, TokenExchangeClient};
pub use storage::{RequestProbe, STORAGE_HOST};
pub use transport::{HttpTransport, ReqwestTransport, TransportError, TransportResponse};
pub use validator::{Stage, ValidationReport, Validator};
