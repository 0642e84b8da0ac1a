//! The lesson pipeline orchestrator.
//!
//! One request runs a small state machine:
//!
//! ```text
//! Optimize -> Generate -> Review -> Accepted  -> Done
//!                ^            |  -> Exhausted -> Done
//!                +-- Retry <--+
//! any stage failure -> Failed -> Done
//! ```
//!
//! Optimization runs exactly once. Each rejected review carries its feedback
//! into the next generation attempt until `max_retries` regenerations have
//! been spent. Transport and provider failures are never retried: they end
//! the run with `error` set, so infrastructure problems are not disguised as
//! content problems.
//!
//! All per-request state lives in [`AttemptState`], created and dropped
//! inside [`Orchestrator::run_with_cancel`]. The orchestrator itself is
//! immutable and can be shared across concurrent requests.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use tutorflow_types::config::{MAX_RETRIES_LIMIT, PipelineConfig};
use tutorflow_types::{PipelineError, PipelineResult, ReviewVerdict, Role, StageFailure};

use crate::prompts::{self, Revision};
use crate::review::parse_review;
use crate::stage::StageClient;

/// Mutable state of one request, owned by a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptState {
    /// 1-based number of the current generate/review cycle.
    pub attempt_number: u32,
    /// Optimizer output.
    pub optimized_prompt: String,
    /// Most recently generated dialogue.
    pub last_content: String,
    /// Feedback from the most recent review.
    pub last_feedback: String,
    /// Set once a review passes.
    pub accepted: bool,
}

impl AttemptState {
    fn new() -> Self {
        Self {
            attempt_number: 1,
            optimized_prompt: String::new(),
            last_content: String::new(),
            last_feedback: String::new(),
            accepted: false,
        }
    }

    /// Regenerations performed so far.
    pub fn retry_count(&self) -> u32 {
        self.attempt_number.saturating_sub(1)
    }
}

/// States of the per-request machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Call the optimizer with the raw topic.
    Optimize,
    /// Call the generator for the current attempt.
    Generate,
    /// Call the reviewer on freshly generated content.
    Review,
    /// The latest review passed.
    Accepted,
    /// The latest review failed and another attempt is allowed.
    Retry,
    /// The latest review failed and the ceiling is reached.
    Exhausted,
    /// A stage failed; the run is aborted.
    Failed(PipelineError),
    /// Terminal.
    Done,
}

/// Drives optimize, generate and review for each request.
#[derive(Clone)]
pub struct Orchestrator {
    client: Arc<dyn StageClient>,
    config: PipelineConfig,
}

impl Orchestrator {
    /// Create an orchestrator over `client` with the given retry policy.
    ///
    /// `max_retries` is capped at [`MAX_RETRIES_LIMIT`].
    pub fn new(client: Arc<dyn StageClient>, mut config: PipelineConfig) -> Self {
        if config.max_retries > MAX_RETRIES_LIMIT {
            warn!(
                requested = config.max_retries,
                limit = MAX_RETRIES_LIMIT,
                "max_retries above ceiling, capping"
            );
            config.max_retries = MAX_RETRIES_LIMIT;
        }
        Self { client, config }
    }

    /// The retry and deadline policy.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline for `topic` to completion.
    pub async fn run(&self, topic: &str) -> PipelineResult {
        self.run_with_cancel(topic, &CancellationToken::new()).await
    }

    /// Run the pipeline for `topic`, giving up if `cancel` fires.
    ///
    /// The token is checked before every remote call and raced against the
    /// call in flight. The returned record is well formed in every outcome.
    pub async fn run_with_cancel(&self, topic: &str, cancel: &CancellationToken) -> PipelineResult {
        let request_id = Uuid::new_v4();
        let span = info_span!("pipeline", %request_id);
        self.drive(topic, cancel).instrument(span).await
    }

    async fn drive(&self, topic: &str, cancel: &CancellationToken) -> PipelineResult {
        let mut result = PipelineResult::new(topic);
        let mut state = AttemptState::new();

        let mut step = if topic.trim().is_empty() {
            Step::Failed(PipelineError::InvalidInput("topic is empty".into()))
        } else {
            info!(max_retries = self.config.max_retries, "pipeline started");
            Step::Optimize
        };

        while step != Step::Done {
            step = self.advance(step, topic, &mut state, &mut result, cancel).await;
        }

        result
    }

    /// Perform one transition.
    async fn advance(
        &self,
        step: Step,
        topic: &str,
        state: &mut AttemptState,
        result: &mut PipelineResult,
        cancel: &CancellationToken,
    ) -> Step {
        match step {
            Step::Optimize => {
                info!("optimizing prompt");
                match self
                    .call(Role::Optimizer, &prompts::optimize_instruction(topic), cancel)
                    .await
                {
                    Ok(optimized) => {
                        result.optimized_prompt = optimized.clone();
                        state.optimized_prompt = optimized;
                        Step::Generate
                    }
                    Err(err) => Step::Failed(err),
                }
            }

            Step::Generate => {
                let previous = (state.attempt_number > 1).then(|| Revision {
                    previous_content: &state.last_content,
                    feedback: &state.last_feedback,
                });
                let instruction =
                    prompts::generate_instruction(&state.optimized_prompt, previous.as_ref());
                info!(attempt = state.attempt_number, "generating dialogue");

                match self.call(Role::Generator, &instruction, cancel).await {
                    Ok(content) => {
                        result.dialog_content = content.clone();
                        state.last_content = content;
                        Step::Review
                    }
                    Err(err) => Step::Failed(err),
                }
            }

            Step::Review => {
                info!(attempt = state.attempt_number, "reviewing dialogue");
                let instruction = prompts::review_instruction(&state.last_content);
                match self.call(Role::Reviewer, &instruction, cancel).await {
                    Ok(raw) => {
                        let ReviewVerdict { passed, feedback } = parse_review(&raw);
                        result.review_passed = passed;
                        result.review_feedback = feedback.clone();
                        state.last_feedback = feedback;

                        if passed {
                            Step::Accepted
                        } else if state.retry_count() < self.config.max_retries {
                            Step::Retry
                        } else {
                            Step::Exhausted
                        }
                    }
                    Err(err) => Step::Failed(err),
                }
            }

            Step::Accepted => {
                state.accepted = true;
                result.review_passed = true;
                result.final_content = state.last_content.clone();
                result.retry_count = state.retry_count();
                info!(retry_count = result.retry_count, "review passed");
                Step::Done
            }

            Step::Retry => {
                warn!(
                    attempt = state.attempt_number,
                    feedback = %state.last_feedback,
                    "review rejected dialogue, regenerating"
                );
                state.attempt_number += 1;
                Step::Generate
            }

            Step::Exhausted => {
                result.review_passed = false;
                result.final_content.clear();
                result.retry_count = state.retry_count();
                if result.review_feedback.is_empty() {
                    result.review_feedback = format!(
                        "content did not pass review after {} attempts",
                        state.attempt_number
                    );
                }
                warn!(
                    attempts = state.attempt_number,
                    "retries exhausted without an accepted dialogue"
                );
                Step::Done
            }

            Step::Failed(err) => {
                warn!(error = %err, "pipeline aborted");
                result.review_passed = false;
                result.final_content.clear();
                result.retry_count = state.retry_count();
                result.error = Some(err.to_string());
                Step::Done
            }

            Step::Done => Step::Done,
        }
    }

    /// One stage call, honouring cancellation and the stage deadline.
    async fn call(
        &self,
        role: Role,
        user_instruction: &str,
        cancel: &CancellationToken,
    ) -> Result<String, PipelineError> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled { role });
        }

        let invocation = self
            .client
            .invoke(role, prompts::system_instruction(role), user_instruction);

        let outcome = async {
            match self.config.stage_timeout_secs {
                Some(secs) => {
                    match tokio::time::timeout(Duration::from_secs(secs), invocation).await {
                        Ok(res) => res.map_err(stage_error),
                        Err(_) => Err(PipelineError::Timeout { role, secs }),
                    }
                }
                None => invocation.await.map_err(stage_error),
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PipelineError::Cancelled { role }),
            res = outcome => res,
        }
    }
}

fn stage_error(failure: StageFailure) -> PipelineError {
    match failure.role {
        Role::Optimizer => PipelineError::Optimization(failure),
        Role::Generator | Role::Reviewer => PipelineError::RemoteCall(failure),
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
