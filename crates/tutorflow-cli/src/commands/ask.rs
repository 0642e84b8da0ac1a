//! `tutorflow ask` -- run the pipeline once and print the result.
//!
//! # Examples
//!
//! ```text
//! tutorflow ask explain conservation of momentum
//! tutorflow ask "Newton's first law" --json
//! ```

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use clap::Args;
use tracing::info;

use tutorflow_core::build_orchestrator;
use tutorflow_types::{PipelineOutcome, PipelineResult};

/// Arguments for `tutorflow ask`.
#[derive(Args)]
pub struct AskArgs {
    /// Topic or question to teach. Multiple words are joined with spaces.
    #[arg(required = true, num_args = 1.., value_name = "TOPIC")]
    pub words: Vec<String>,

    /// Print the raw result record as JSON.
    #[arg(long)]
    pub json: bool,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

impl AskArgs {
    /// The topic as one string.
    pub fn topic(&self) -> String {
        self.words.join(" ")
    }
}

/// Run the `ask` command.
///
/// Returns an error after printing when the pipeline failed upstream, so the
/// process exits non-zero.
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let orchestrator = build_orchestrator(&config);
    let topic = args.topic();

    let started = Instant::now();
    let result = orchestrator.run(&topic).await;
    let elapsed = started.elapsed();
    info!(
        elapsed_ms = elapsed.as_millis() as u64,
        outcome = ?result.outcome(),
        "request finished"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_report(&result, elapsed));
    }

    match result.error {
        Some(err) => anyhow::bail!("pipeline failed: {err}"),
        None => Ok(()),
    }
}

/// Human-readable report of one run.
pub fn render_report(result: &PipelineResult, elapsed: Duration) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Topic: {}", result.original_input);
    let _ = writeln!(out, "{rule}");

    if !result.optimized_prompt.is_empty() {
        let _ = writeln!(out, "\n[Optimized prompt]\n{}", result.optimized_prompt);
    }
    if !result.dialog_content.is_empty() {
        let _ = writeln!(out, "\n[Generated dialogue]\n{}", result.dialog_content);
    }

    let status = if result.review_passed { "PASS" } else { "FAIL" };
    let _ = writeln!(out, "\n[Review] {status}");
    if !result.review_feedback.is_empty() {
        let _ = writeln!(out, "{}", result.review_feedback);
    }

    match result.outcome() {
        PipelineOutcome::Accepted => {
            let _ = writeln!(out, "\n[Final content]\n{}", result.final_content);
        }
        PipelineOutcome::RetriesExhausted => {
            let _ = writeln!(
                out,
                "\nThe dialogue did not pass review; no content was published."
            );
        }
        PipelineOutcome::Failed => {
            let _ = writeln!(
                out,
                "\nError: {}",
                result.error.as_deref().unwrap_or_default()
            );
        }
    }

    let _ = writeln!(out, "\nRetries: {}", result.retry_count);
    let _ = writeln!(out, "Elapsed: {:.2}s", elapsed.as_secs_f64());
    out
}
