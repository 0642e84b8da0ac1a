//! The externally visible pipeline record.

use serde::{Deserialize, Serialize};

/// Outcome of one pipeline run, as handed to front ends.
///
/// Every field is always present. On upstream failure the content fields keep
/// whatever the pipeline produced before the failure and `error` carries a
/// human-readable cause. `final_content` is non-empty exactly when
/// `review_passed` is true, so callers must check `review_passed` and not
/// only the absence of `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// The caller's topic, verbatim.
    pub original_input: String,

    /// Optimizer output, or empty if optimization did not complete.
    pub optimized_prompt: String,

    /// Most recently generated dialogue, accepted or not.
    pub dialog_content: String,

    /// Whether the last review accepted the dialogue.
    pub review_passed: bool,

    /// Feedback from the most recent review.
    pub review_feedback: String,

    /// The accepted dialogue; empty unless `review_passed`.
    pub final_content: String,

    /// Number of regeneration attempts beyond the first.
    pub retry_count: u32,

    /// Cause of a fatal failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// How a run ended, derived from a [`PipelineResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// A review passed and `final_content` holds the dialogue.
    Accepted,
    /// Every attempt was rejected; no usable content.
    RetriesExhausted,
    /// An upstream failure aborted the run.
    Failed,
}

impl PipelineResult {
    /// An empty record for `original_input`.
    pub fn new(original_input: impl Into<String>) -> Self {
        Self {
            original_input: original_input.into(),
            ..Self::default()
        }
    }

    /// Classify the record.
    pub fn outcome(&self) -> PipelineOutcome {
        if self.error.is_some() {
            PipelineOutcome::Failed
        } else if self.review_passed {
            PipelineOutcome::Accepted
        } else {
            PipelineOutcome::RetriesExhausted
        }
    }

    /// True when the record carries content a caller may show.
    pub fn is_usable(&self) -> bool {
        self.outcome() == PipelineOutcome::Accepted
    }
}
