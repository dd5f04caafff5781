//! Core types, configuration, and clock abstraction for ycprobe.
//!
//! This crate holds what every other ycprobe crate shares: the
//! [`CredentialSet`] being validated, the serialized [`CredentialRecord`]
//! supplied by the settings form, the [`ProbeConfig`] for the transport, and
//! the [`Clock`] used to stamp signed artifacts.

mod clock;
mod config;
mod credentials;
mod error;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{DEFAULT_USER_AGENT, ProbeConfig};
pub use credentials::{CredentialRecord, CredentialSet};
pub use error::{CoreError, CoreResult};
