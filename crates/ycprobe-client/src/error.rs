//! Error taxonomy for credential validation.
//!
//! Every failure is terminal and none is retried. A [`ValidationFailure`]
//! pairs the [`ValidationError`] with the last [`Stage`] reached.

use std::fmt;

use http::StatusCode;
use serde::Serialize;
use ycprobe_auth::{AmzDateError, AssertionError};

use crate::transport::TransportError;
use crate::validator::Stage;

/// A remote service rejected a request, or could not be reached.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The exchange did not complete.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The service answered with a non-success status.
    #[error("unexpected status {status}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Response body.
        body: String,
    },

    /// A success response lacked a required field.
    #[error("response is missing {field}")]
    MissingField {
        /// Name of the missing JSON field.
        field: &'static str,
        /// HTTP status code.
        status: StatusCode,
        /// Response body.
        body: String,
    },

    /// The request could not be constructed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RemoteError {
    /// HTTP status of the rejected response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } | Self::MissingField { status, .. } => Some(*status),
            Self::Transport(_) | Self::InvalidRequest(_) => None,
        }
    }

    /// Body of the rejected response, if one was received.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } | Self::MissingField { body, .. } => Some(body),
            Self::Transport(_) | Self::InvalidRequest(_) => None,
        }
    }
}

/// Credential material that cannot be used as given.
#[derive(Debug, thiserror::Error)]
pub enum CredentialFormatError {
    /// The authorized key could not sign an assertion.
    #[error("could not generate signing assertion; check key material")]
    Assertion(#[from] AssertionError),

    /// The clock produced an instant with no `X-Amz-Date` form.
    #[error("could not generate signing timestamp; check system clock")]
    Timestamp(#[from] AmzDateError),

    /// A signed header value is not representable in HTTP.
    #[error("invalid {header} header value; check static key")]
    HeaderValue {
        /// Header name.
        header: &'static str,
    },
}

/// Why a validation run failed.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Credential material is malformed.
    #[error(transparent)]
    CredentialFormat(#[from] CredentialFormatError),

    /// The identity token exchange failed.
    #[error("could not obtain identity token; check credentials")]
    TokenExchange(#[source] RemoteError),

    /// The signed storage request failed.
    #[error("could not list buckets; check static key")]
    StorageAuth(#[source] RemoteError),

    /// The caller cancelled the run.
    #[error("validation cancelled")]
    Cancelled,
}

impl ValidationError {
    /// Classification tag.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CredentialFormat(_) => ErrorKind::CredentialFormat,
            Self::TokenExchange(_) => ErrorKind::TokenExchange,
            Self::StorageAuth(_) => ErrorKind::StorageAuth,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// HTTP status of the remote rejection, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::TokenExchange(e) | Self::StorageAuth(e) => e.status(),
            Self::CredentialFormat(_) | Self::Cancelled => None,
        }
    }

    /// Response body of the remote rejection, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::TokenExchange(e) | Self::StorageAuth(e) => e.body(),
            Self::CredentialFormat(_) | Self::Cancelled => None,
        }
    }

    /// Message suitable for showing to whoever entered the credentials.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Malformed key material or header values.
    CredentialFormat,
    /// Identity token exchange rejected or unreachable.
    TokenExchange,
    /// Signed storage request rejected or unreachable.
    StorageAuth,
    /// Cancelled by the caller.
    Cancelled,
}

impl ErrorKind {
    /// Stable name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CredentialFormat => "CredentialFormat",
            Self::TokenExchange => "TokenExchange",
            Self::StorageAuth => "StorageAuth",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a validation run.
#[derive(Debug, thiserror::Error)]
#[error("validation failed after {stage}: {error}")]
pub struct ValidationFailure {
    /// Last stage reached before the failure.
    pub stage: Stage,
    /// What went wrong.
    #[source]
    pub error: ValidationError,
}

impl ValidationFailure {
    pub(crate) fn new(stage: Stage, error: impl Into<ValidationError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }

    /// Classification tag of the underlying error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(code: u16) -> RemoteError {
        RemoteError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            body: String::from("{\"message\":\"denied\"}"),
        }
    }

    #[test]
    fn test_should_render_user_messages() {
        assert_eq!(
            ValidationError::TokenExchange(status_error(401)).user_message(),
            "could not obtain identity token; check credentials"
        );
        assert_eq!(
            ValidationError::StorageAuth(status_error(403)).user_message(),
            "could not list buckets; check static key"
        );
        let format = ValidationError::from(CredentialFormatError::Assertion(
            AssertionError::InvalidIssueTime(-1),
        ));
        assert_eq!(
            format.user_message(),
            "could not generate signing assertion; check key material"
        );
        let clock = ValidationError::from(CredentialFormatError::Timestamp(AmzDateError(
            String::from("+100000101T000000Z"),
        )));
        assert_eq!(clock.kind(), ErrorKind::CredentialFormat);
        assert_eq!(
            clock.user_message(),
            "could not generate signing timestamp; check system clock"
        );
    }

    #[test]
    fn test_should_expose_remote_status_and_body() {
        let err = ValidationError::StorageAuth(status_error(403));
        assert_eq!(err.kind(), ErrorKind::StorageAuth);
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.body(), Some("{\"message\":\"denied\"}"));
    }

    #[test]
    fn test_should_have_no_status_for_transport_failure() {
        let err = ValidationError::TokenExchange(RemoteError::Transport(TransportError::Timeout));
        assert_eq!(err.kind(), ErrorKind::TokenExchange);
        assert!(err.status().is_none());
        assert!(err.body().is_none());
    }

    #[test]
    fn test_should_serialize_kind_as_name() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::CredentialFormat).unwrap(),
            "\"CredentialFormat\""
        );
        assert_eq!(ErrorKind::Cancelled.to_string(), "Cancelled");
    }

    #[test]
    fn test_should_tag_failure_with_stage() {
        let failure = ValidationFailure::new(Stage::AssertionBuilt, ValidationError::Cancelled);
        assert_eq!(failure.kind(), ErrorKind::Cancelled);
        assert_eq!(
            failure.to_string(),
            "validation failed after AssertionBuilt: validation cancelled"
        );
    }
}
