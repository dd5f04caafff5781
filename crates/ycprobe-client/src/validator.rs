//! Validation orchestrator.
//!
//! A run moves through [`Stage`]s in order and stops at the first failure:
//!
//! ```text
//! Start -> AssertionBuilt -> TokenObtained -> Signed -> Probed
//! ```
//!
//! Both checks always run: the storage probe is only attempted once the
//! identity token exchange has succeeded.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use ycprobe_auth::{AmzDate, AssertionBuilder, SigV4Signer};
use ycprobe_core::{Clock, CredentialSet, SystemClock};

use crate::error::{CredentialFormatError, ValidationError, ValidationFailure};
use crate::iam::TokenExchangeClient;
use crate::storage::{RequestProbe, STORAGE_HOST};
use crate::transport::HttpTransport;

/// Progress of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    /// Nothing done yet.
    Start,
    /// The JWT assertion was signed.
    AssertionBuilt,
    /// The IAM service issued a bearer token.
    TokenObtained,
    /// The storage request was signed.
    Signed,
    /// The storage service accepted the signed request.
    Probed,
}

impl Stage {
    /// Stable name of the stage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::AssertionBuilt => "AssertionBuilt",
            Self::TokenObtained => "TokenObtained",
            Self::Signed => "Signed",
            Self::Probed => "Probed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Display name of the validated profile.
    pub display_name: String,
    /// `X-Amz-Date` the storage request was signed with.
    pub amz_date: String,
    /// Status returned by the storage service.
    pub storage_status: StatusCode,
    /// Token expiry reported by the IAM service, if any.
    pub token_expires_at: Option<String>,
}

/// Validates credential sets against the IAM and storage services.
///
/// Holds no per-run state; one instance may serve concurrent runs.
#[derive(Debug)]
pub struct Validator<T> {
    transport: T,
    clock: Arc<dyn Clock>,
}

impl<T: HttpTransport> Validator<T> {
    /// Create a validator that reads the system clock.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for assertion and signing timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run both checks for `credentials`.
    ///
    /// Cancelling `cancel` aborts the pending network call and fails the run
    /// with [`ValidationError::Cancelled`]; no further requests are made.
    pub async fn validate(
        &self,
        credentials: &CredentialSet,
        cancel: &CancellationToken,
    ) -> Result<ValidationReport, ValidationFailure> {
        let display_name = credentials.display_name();
        let mut stage = Stage::Start;
        info!(display_name, "validating credentials");

        if cancel.is_cancelled() {
            return Err(fail(display_name, stage, ValidationError::Cancelled));
        }

        let assertion = AssertionBuilder::new(
            credentials.service_account_id(),
            credentials.public_key_id(),
            credentials.private_key_pem(),
        )
        .build(self.clock.now())
        .map_err(|e| fail(display_name, stage, CredentialFormatError::from(e)))?;
        stage = advance(display_name, Stage::AssertionBuilt);

        let token = until_cancelled(
            cancel,
            TokenExchangeClient::new(&self.transport).exchange(&assertion),
        )
        .await
        .ok_or_else(|| fail(display_name, stage, ValidationError::Cancelled))?
        .map_err(|e| fail(display_name, stage, ValidationError::TokenExchange(e)))?;
        stage = advance(display_name, Stage::TokenObtained);

        let amz_date = AmzDate::from_datetime(self.clock.now())
            .map_err(|e| fail(display_name, stage, CredentialFormatError::from(e)))?;
        let signed = SigV4Signer::new(credentials.static_key_id(), credentials.static_key_secret())
            .sign_get(STORAGE_HOST, &amz_date);
        stage = advance(display_name, Stage::Signed);

        let storage_status = until_cancelled(cancel, RequestProbe::new(&self.transport).probe(&signed))
            .await
            .ok_or_else(|| fail(display_name, stage, ValidationError::Cancelled))?
            .map_err(|e| fail(display_name, stage, e))?;
        advance(display_name, Stage::Probed);

        info!(
            display_name,
            status = storage_status.as_u16(),
            "credentials passed"
        );

        Ok(ValidationReport {
            display_name: display_name.to_owned(),
            amz_date: signed.amz_date,
            storage_status,
            token_expires_at: token.expires_at().map(str::to_owned),
        })
    }
}

/// Await `future` unless `cancel` fires first.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, future: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        output = future => Some(output),
    }
}

fn advance(display_name: &str, stage: Stage) -> Stage {
    info!(display_name, %stage, "stage reached");
    stage
}

fn fail(display_name: &str, stage: Stage, error: impl Into<ValidationError>) -> ValidationFailure {
    let failure = ValidationFailure::new(stage, error);
    warn!(display_name, %stage, kind = %failure.kind(), "credentials failed");
    failure
}
