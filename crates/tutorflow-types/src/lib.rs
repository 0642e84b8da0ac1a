//! # tutorflow-types
//!
//! Core type definitions for the tutorflow lesson pipeline.
//!
//! Every other tutorflow crate depends on this one. It contains:
//!
//! - **[`role`]** -- the three generation stage roles
//! - **[`verdict`]** -- the parsed outcome of a review call
//! - **[`result`]** -- [`PipelineResult`], the record handed to front ends
//! - **[`error`]** -- [`StageFailure`], [`PipelineError`] and [`ConfigError`]
//! - **[`config`]** -- configuration schema
//! - **[`secret`]** -- [`ApiKey`], a redacting credential wrapper

pub mod config;
pub mod error;
pub mod result;
pub mod role;
pub mod secret;
pub mod verdict;

pub use config::Config;
pub use error::{ConfigError, PipelineError, StageFailure};
pub use result::{PipelineOutcome, PipelineResult};
pub use role::Role;
pub use secret::ApiKey;
pub use verdict::ReviewVerdict;
