//! Configuration for the credential probe.
//!
//! Provides [`ProbeConfig`]. Endpoints are fixed by the remote services and
//! are deliberately absent; only the transport and logging are tunable.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use typed_builder::TypedBuilder;

use crate::error::{CoreError, CoreResult};

/// Default user agent sent by the HTTP transport.
pub const DEFAULT_USER_AGENT: &str = concat!("ycprobe/", env!("CARGO_PKG_VERSION"));

/// Probe configuration.
///
/// # Examples
///
/// ```
/// use ycprobe_core::ProbeConfig;
///
/// let config = ProbeConfig::default();
/// assert_eq!(config.log_level, "info");
/// assert!(config.request_timeout().is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ProbeConfig {
    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Whole-request timeout in seconds; `None` keeps the transport default.
    #[builder(default)]
    pub request_timeout_secs: Option<u64>,

    /// Connect timeout in seconds; `None` keeps the transport default.
    #[builder(default)]
    pub connect_timeout_secs: Option<u64>,

    /// User agent sent with both remote requests.
    #[builder(default = String::from(DEFAULT_USER_AGENT))]
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            log_level: String::from("info"),
            request_timeout_secs: None,
            connect_timeout_secs: None,
            user_agent: String::from(DEFAULT_USER_AGENT),
        }
    }
}

impl ProbeConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `LOG_LEVEL` | `info` |
    /// | `YCPROBE_REQUEST_TIMEOUT_SECS` | *(transport default)* |
    /// | `YCPROBE_CONNECT_TIMEOUT_SECS` | *(transport default)* |
    /// | `YCPROBE_USER_AGENT` | `ycprobe/<version>` |
    ///
    /// Unparsable numbers are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(n) = parse_secs(&lookup, "YCPROBE_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = Some(n);
        }
        if let Some(n) = parse_secs(&lookup, "YCPROBE_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout_secs = Some(n);
        }
        if let Some(v) = lookup("YCPROBE_USER_AGENT") {
            config.user_agent = v;
        }

        config
    }

    /// Reject settings the transport cannot honour.
    pub fn validate(&self) -> CoreResult<()> {
        if self.request_timeout_secs == Some(0) {
            return Err(CoreError::Config(
                "request timeout must be greater than zero".to_owned(),
            ));
        }
        if self.connect_timeout_secs == Some(0) {
            return Err(CoreError::Config(
                "connect timeout must be greater than zero".to_owned(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(CoreError::Config("user agent must not be empty".to_owned()));
        }
        Ok(())
    }

    /// Whole-request timeout, if configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Connect timeout, if configured.
    #[must_use]
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u64> {
    let value = lookup(name)?;
    match value.trim().parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(variable = name, value = %value, "ignoring non-numeric timeout");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = ProbeConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.connect_timeout_secs, None);
        assert!(config.user_agent.starts_with("ycprobe/"));
        assert!(config.validate().is_ok());
    }

    fn lookup_from(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| vars.get(name).map(|v| (*v).to_owned())
    }

    #[test]
    fn test_should_load_from_env() {
        let config = ProbeConfig::from_env();
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn test_should_read_every_variable() {
        let config = ProbeConfig::from_lookup(lookup_from(&[
            ("LOG_LEVEL", "debug"),
            ("YCPROBE_REQUEST_TIMEOUT_SECS", "30"),
            ("YCPROBE_CONNECT_TIMEOUT_SECS", " 5 "),
            ("YCPROBE_USER_AGENT", "probe-agent/1.0"),
        ]));

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.connect_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.user_agent, "probe-agent/1.0");
    }

    #[test]
    fn test_should_ignore_non_numeric_timeouts() {
        let config = ProbeConfig::from_lookup(lookup_from(&[
            ("YCPROBE_REQUEST_TIMEOUT_SECS", "thirty"),
            ("YCPROBE_CONNECT_TIMEOUT_SECS", "-1"),
        ]));

        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.connect_timeout_secs, None);
        assert_eq!(config.log_level, "info");
        assert!(config.user_agent.starts_with("ycprobe/"));
    }

    #[test]
    fn test_should_keep_defaults_without_variables() {
        let config = ProbeConfig::from_lookup(|_| None);
        assert_eq!(config.log_level, "info");
        assert!(config.request_timeout().is_none());
        assert!(config.connect_timeout().is_none());
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_should_build_with_typed_builder() {
        let config = ProbeConfig::builder()
            .log_level("debug".into())
            .request_timeout_secs(Some(30))
            .connect_timeout_secs(Some(5))
            .user_agent("probe-test".into())
            .build();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.connect_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.user_agent, "probe-test");
    }

    #[test]
    fn test_should_reject_zero_timeouts() {
        let config = ProbeConfig::builder().request_timeout_secs(Some(0)).build();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = ProbeConfig::builder().connect_timeout_secs(Some(0)).build();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_should_reject_blank_user_agent() {
        let config = ProbeConfig::builder().user_agent("  ".into()).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_should_serialize_to_camel_case_json() {
        let config = ProbeConfig::builder().request_timeout_secs(Some(10)).build();
        let json = serde_json::to_string(&config).expect("test serialization");
        assert!(json.contains("\"logLevel\":\"info\""));
        assert!(json.contains("\"requestTimeoutSecs\":10"));
        assert!(json.contains("\"connectTimeoutSecs\":null"));
    }
}
