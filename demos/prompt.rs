//! Send one prompt to Gemini and print the normalized result.
//!
//! Usage:
//!   GOOGLE_API_KEY=... cargo run --example prompt -- "2+2=?"
//!   GOOGLE_API_KEY=... cargo run --example prompt -- --json "three primes as a JSON array"
//!   GOOGLE_API_KEY=... cargo run --example prompt -- --model gemini-2.0-flash --timeout-secs 10 "hi"
//!
//! Ctrl-C cancels the in-flight call.

use std::time::Duration;

use clap::Parser;
use gemini_llm::{CallOptions, Credentials, GeminiConfig, GeminiLlm};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "prompt", about = "One-shot Gemini call")]
struct Cli {
    /// Prompt text
    prompt: String,

    /// Model to use
    #[arg(long, default_value = gemini_llm::config::DEFAULT_MODEL)]
    model: String,

    /// Ask for JSON output
    #[arg(long)]
    json: bool,

    /// Per-call timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// API base URL
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = GeminiConfig::new(&cli.model);
    if let Some(ref url) = cli.base_url {
        config = config.with_base_url(url);
    }

    let llm = match GeminiLlm::with_config(config, &Credentials::from_env()) {
        Ok(llm) => llm,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let options = CallOptions {
        json: cli.json,
        ..CallOptions::default()
    }
    .with_timeout(Duration::from_secs(cli.timeout_secs));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let result = llm.invoke_with_cancel(&cli.prompt, &options, cancel).await;
    match result.into_result() {
        Ok(completion) => {
            println!("{}", completion.text);
            eprintln!(
                "\x1b[2m  [{}in / {}out / {}total tokens]\x1b[0m",
                completion.usage.prompt_tokens,
                completion.usage.completion_tokens,
                completion.usage.total_tokens
            );
        }
        Err(failure) => {
            eprintln!("\x1b[1;31merror ({}):\x1b[0m {}", failure.kind, failure.message);
            std::process::exit(2);
        }
    }
}
