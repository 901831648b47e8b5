//! Command-line entry point: argument parsing, narration and the final report.

use crate::config;
use crate::logging;
use crate::search::providers::{GoogleCseExecutor, GoogleCseOptions};
use crate::search::tracker::AttemptFailure;
use crate::search::{CredentialPool, RankTracker, SearchEvent, SearchOutcome, Termination, TrackerOptions};
use crate::sink::ResultSink;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::mpsc;

/// Check where a domain ranks for a keyword on Google Custom Search
#[derive(Debug, Parser)]
#[command(name = "rankcheck")]
#[command(version)]
pub struct Cli {
    /// Keyword to search for
    #[arg(long)]
    pub keyword: String,

    /// Target domain (e.g. imgur.com)
    #[arg(long)]
    pub domain: String,

    /// Country code (e.g. us, mx, es)
    #[arg(long, default_value = "us")]
    pub country: String,

    /// Maximum number of results to inspect
    #[arg(long, default_value_t = 50)]
    pub results: u64,

    /// Optional proxy (e.g. 127.0.0.1:8080)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Settings file [default: ~/.config/rankcheck/config.toml]
    #[arg(long, env = "RANKCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory receiving the result log
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Write a debug log file
    #[arg(long)]
    pub debug: bool,
}

/// Parse arguments and run. Exit code 1 only for configuration problems
/// found before the search starts.
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Run a full search for parsed arguments.
pub async fn execute(cli: Cli) -> Result<()> {
    let mut settings = config::load_or_create_config(cli.config.as_deref())?;
    if cli.debug {
        settings.debug = true;
    }
    let _log_guard = logging::init(&settings)?;

    let mut pool = CredentialPool::new(settings.api_keys.clone(), settings.search_engine_ids.clone())
        .context("Invalid credential configuration")?;

    let executor = GoogleCseExecutor::new(GoogleCseOptions {
        endpoint: settings.endpoint.clone(),
        timeout: Duration::from_secs(settings.timeout_secs),
        accept_invalid_certs: settings.accept_invalid_certs,
        proxy: cli.proxy.clone(),
    })?;

    let results = usize::try_from(cli.results).context("--results is too large")?;
    let options = TrackerOptions {
        results,
        country: cli.country.clone(),
        page_delay: Duration::from_millis(settings.page_delay_ms),
    };

    println!("Searching '{}' in {}...", cli.keyword, cli.country.to_uppercase());

    let (tx, rx) = mpsc::unbounded_channel();
    let keyword = cli.keyword.as_str();
    let domain = cli.domain.as_str();
    let mut tracker = RankTracker::new(&executor, &mut pool, options).with_events(tx);
    let (outcome, ()) = tokio::join!(
        async move {
            let outcome = tracker.run(keyword, domain).await;
            drop(tracker); // closes the event channel
            outcome
        },
        narrate(rx)
    );

    println!();
    println!("{}", verdict(&outcome, domain, results));

    let sink = ResultSink::new(&cli.output_dir, keyword, &cli.country);
    match sink.append_today(&outcome) {
        Ok(_) => println!("Results saved to {}", sink.path().display()),
        Err(e) => {
            tracing::error!(error = %e, "failed to save results");
            eprintln!("{}", e);
        }
    }

    Ok(())
}

async fn narrate(mut rx: mpsc::UnboundedReceiver<SearchEvent>) {
    while let Some(event) = rx.recv().await {
        if let Some(line) = describe(&event) {
            println!("{}", line);
        }
    }
}

/// Console line for a progress event, if it deserves one.
pub fn describe(event: &SearchEvent) -> Option<String> {
    match event {
        SearchEvent::PageStarted { start, num } => {
            Some(format!("Fetching results {}-{}...", start, start + num - 1))
        }
        SearchEvent::AttemptFailed { key, failure, .. } => Some(match failure {
            AttemptFailure::QuotaExceeded => {
                format!("API key {} exceeded its quota. Trying another...", key)
            }
            AttemptFailure::Transient(detail) => format!("Error with {}: {}", key, detail),
            AttemptFailure::Empty => format!("No results or limit reached with {}.", key),
        }),
        SearchEvent::CredentialsExhausted { .. } => Some("All API keys failed.".to_string()),
        SearchEvent::PageCollected { .. } | SearchEvent::Matched { .. } => None,
    }
}

/// Final report line(s) for an outcome.
pub fn verdict(outcome: &SearchOutcome, domain: &str, results: usize) -> String {
    match (outcome.matched_position(), outcome.matched_link()) {
        (Some(position), Some(link)) => {
            format!("{} found at position #{}\n{}", domain, position, link)
        }
        _ => {
            let mut line = format!("{} was not found in the first {} results.", domain, results);
            if outcome.termination() == Some(Termination::CredentialsExhausted) {
                line.push_str(&format!(
                    " The search stopped early after {} results because all API keys failed.",
                    outcome.len()
                ));
            }
            line
        }
    }
}
