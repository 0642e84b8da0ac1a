//! `tutorflow interactive` -- console loop over the pipeline.
//!
//! Reads one topic per line from stdin, runs the pipeline and prints the
//! report. `exit` or `quit` ends the loop, as does EOF. Ctrl-C cancels the
//! request in flight without leaving the loop.

use std::time::Instant;

use clap::Args;
use tokio::io::AsyncBufReadExt;
use tokio_util::sync::CancellationToken;

use tutorflow_core::build_orchestrator;

use super::ask::render_report;

/// Arguments for `tutorflow interactive`.
#[derive(Args)]
pub struct InteractiveArgs {
    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

/// One line of console input, classified.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    /// Leave the loop.
    Quit,
    /// Nothing usable was typed.
    Empty,
    /// A topic to run.
    Topic(&'a str),
}

/// Classify a raw input line.
pub fn classify(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Input::Empty
    } else if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        Input::Quit
    } else {
        Input::Topic(trimmed)
    }
}

/// Run the interactive loop.
pub async fn run(args: InteractiveArgs) -> anyhow::Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let orchestrator = build_orchestrator(&config);

    println!("tutorflow -- interactive mode (type 'exit' to quit)");
    println!(
        "Models: optimizer={} generator={} reviewer={}",
        config.stages.optimizer.model, config.stages.generator.model, config.stages.reviewer.model
    );
    println!();

    let stdin = tokio::io::stdin();
    let mut reader = tokio::io::BufReader::new(stdin).lines();

    loop {
        eprint!("topic> ");
        // Flush stderr so the prompt appears before blocking on read.
        use std::io::Write;
        std::io::stderr().flush().ok();

        let Some(line) = reader.next_line().await? else {
            break;
        };

        let topic = match classify(&line) {
            Input::Quit => break,
            Input::Empty => {
                println!("Please enter a topic.");
                continue;
            }
            Input::Topic(topic) => topic,
        };

        let cancel = CancellationToken::new();
        let interrupt = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.cancel();
            }
        });

        let started = Instant::now();
        let result = orchestrator.run_with_cancel(topic, &cancel).await;
        watcher.abort();

        println!("{}", render_report(&result, started.elapsed()));
    }

    println!("Goodbye.");
    Ok(())
}
