//! Error types for the tutorflow pipeline.
//!
//! [`StageFailure`] is the only error a generation stage call can produce.
//! [`PipelineError`] is the fatal-failure taxonomy of a pipeline run; its
//! display text is what callers see in `PipelineResult::error`. Review
//! rejections and exhausted retries are outcomes, not errors, and do not
//! appear here.

use std::path::PathBuf;

use thiserror::Error;

use crate::role::Role;

/// A role-scoped remote generation call failed.
///
/// Covers transport, authentication, malformed and empty responses alike.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{role} stage failed: {cause}")]
pub struct StageFailure {
    /// The role whose call failed.
    pub role: Role,
    /// Human-readable cause.
    pub cause: String,
}

impl StageFailure {
    /// Create a failure for `role`.
    pub fn new(role: Role, cause: impl Into<String>) -> Self {
        Self {
            role,
            cause: cause.into(),
        }
    }
}

/// Fatal failures that abort a pipeline run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PipelineError {
    /// The optimizer call failed. Never retried.
    #[error("prompt optimization failed: {}", .0.cause)]
    Optimization(StageFailure),

    /// A generator or reviewer call failed. Never retried.
    #[error("{0}")]
    RemoteCall(StageFailure),

    /// A stage call exceeded the configured deadline.
    #[error("{role} stage timed out after {secs}s")]
    Timeout {
        /// The stage that timed out.
        role: Role,
        /// The configured deadline.
        secs: u64,
    },

    /// The caller cancelled the run.
    #[error("request cancelled before {role} stage completed")]
    Cancelled {
        /// The stage that was pending.
        role: Role,
    },

    /// The topic was rejected before any remote call.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PipelineError {
    /// The stage involved, if any.
    pub fn role(&self) -> Option<Role> {
        match self {
            PipelineError::Optimization(f) | PipelineError::RemoteCall(f) => Some(f.role),
            PipelineError::Timeout { role, .. } | PipelineError::Cancelled { role } => Some(*role),
            PipelineError::InvalidInput(_) => None,
        }
    }
}

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the schema.
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A value is semantically invalid.
    #[error("invalid config: {0}")]
    Invalid(String),
}
