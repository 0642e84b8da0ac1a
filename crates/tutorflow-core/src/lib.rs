//! # tutorflow-core
//!
//! The lesson pipeline: a prompt optimizer, a dialogue generator and a fact
//! reviewer run in sequence, with rejected dialogues regenerated using the
//! reviewer's feedback up to a fixed retry ceiling.
//!
//! - **[`stage`]** -- the [`StageClient`] boundary and its provider-backed implementation
//! - **[`prompts`]** -- role system instructions and user instruction builders
//! - **[`review`]** -- the fail-closed reviewer response parser
//! - **[`orchestrator`]** -- the per-request state machine
//! - **[`config_loader`]** -- config discovery and environment overrides
//! - **[`bootstrap`]** -- wiring a [`Config`](tutorflow_types::Config) into an [`Orchestrator`]

pub mod bootstrap;
pub mod config_loader;
pub mod orchestrator;
pub mod prompts;
pub mod review;
pub mod stage;

pub use bootstrap::build_orchestrator;
pub use orchestrator::Orchestrator;
pub use review::parse_review;
pub use stage::{ProviderStageClient, StageClient};
