//! Rendering of validation outcomes.

use serde::Serialize;
use ycprobe_client::{ErrorKind, Stage, ValidationFailure, ValidationReport};

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line.
    #[default]
    Text,
    /// One JSON object.
    Json,
}

/// Machine-readable outcome.
#[derive(Debug, Serialize)]
pub struct Outcome<'a> {
    passed: bool,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,
    stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
}

impl<'a> Outcome<'a> {
    /// Summarize a run of the profile called `name`.
    pub fn new(name: &'a str, result: &Result<ValidationReport, ValidationFailure>) -> Self {
        match result {
            Ok(report) => Self {
                passed: true,
                name,
                kind: None,
                stage: Stage::Probed,
                message: None,
                status: Some(report.storage_status.as_u16()),
            },
            Err(failure) => Self {
                passed: false,
                name,
                kind: Some(failure.kind()),
                stage: failure.stage,
                message: Some(failure.error.user_message()),
                status: failure.error.status().map(|s| s.as_u16()),
            },
        }
    }

    /// Whether the credentials passed.
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Render in `format`.
    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string(self)?),
            OutputFormat::Text if self.passed => Ok(format!("{}: passed", self.name)),
            OutputFormat::Text => Ok(format!(
                "{}: failed: {}",
                self.name,
                self.message.as_deref().unwrap_or_default()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use ycprobe_client::{RemoteError, ValidationError};

    use super::*;

    fn report() -> ValidationReport {
        ValidationReport {
            display_name: String::from("prod"),
            amz_date: String::from("20150830T123600Z"),
            storage_status: StatusCode::OK,
            token_expires_at: None,
        }
    }

    fn storage_failure() -> ValidationFailure {
        ValidationFailure {
            stage: Stage::Signed,
            error: ValidationError::StorageAuth(RemoteError::Status {
                status: StatusCode::FORBIDDEN,
                body: String::from("AccessDenied"),
            }),
        }
    }

    #[test]
    fn test_should_render_pass_as_text() {
        let outcome = Outcome::new("prod", &Ok(report()));
        assert!(outcome.passed());
        assert_eq!(outcome.render(OutputFormat::Text).unwrap(), "prod: passed");
    }

    #[test]
    fn test_should_render_failure_as_text() {
        let outcome = Outcome::new("prod", &Err(storage_failure()));
        assert!(!outcome.passed());
        assert_eq!(
            outcome.render(OutputFormat::Text).unwrap(),
            "prod: failed: could not list buckets; check static key"
        );
    }

    #[test]
    fn test_should_render_failure_as_json() {
        let outcome = Outcome::new("prod", &Err(storage_failure()));
        let value: serde_json::Value =
            serde_json::from_str(&outcome.render(OutputFormat::Json).unwrap()).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "passed": false,
                "name": "prod",
                "kind": "StorageAuth",
                "stage": "Signed",
                "message": "could not list buckets; check static key",
                "status": 403,
            })
        );
    }

    #[test]
    fn test_should_omit_failure_fields_on_pass() {
        let outcome = Outcome::new("prod", &Ok(report()));
        let value: serde_json::Value =
            serde_json::from_str(&outcome.render(OutputFormat::Json).unwrap()).unwrap();

        assert_eq!(value["passed"], true);
        assert_eq!(value["stage"], "Probed");
        assert_eq!(value["status"], 200);
        assert!(value.get("kind").is_none());
        assert!(value.get("message").is_none());
    }
}
