use std::process::ExitCode;

/// Main entry point
#[tokio::main]
async fn main() -> ExitCode {
    rankcheck::cli::run().await
}
