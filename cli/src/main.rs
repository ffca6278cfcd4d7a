//! Command-line interface for the review analyzer.
//!
//! Commands:
//! - analyze: Analyze one review and compare it against the corpus
//! - corpus: Show corpus statistics and the most frequent words
//! - health: Show server and corpus status
//!
//! Configuration via environment:
//! - REVIEW_URL: Base URL of the review server (default: http://localhost:3000)
//! - REVIEW_TIMEOUT_SECS: Request timeout in seconds (default: 300)

mod commands;

use std::time::Duration;

use clap::{Parser, Subcommand};

use commands::{analyze::AnalyzeArgs, corpus::CorpusArgs};

/// Review analyzer CLI
///
/// Talks to a running review-server. Prints JSON by default; pass --human
/// for formatted output.
#[derive(Parser)]
#[command(name = "review")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Review server URL
    #[arg(
        long,
        env = "REVIEW_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    url: String,

    /// Request timeout in seconds
    #[arg(
        long,
        env = "REVIEW_TIMEOUT_SECS",
        default_value_t = commands::DEFAULT_TIMEOUT_SECS,
        global = true
    )]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single review
    Analyze(AnalyzeArgs),

    /// Show corpus statistics
    Corpus(CorpusArgs),

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let client = match commands::build_client(Duration::from_secs(cli.timeout)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let url = cli.url.trim_end_matches('/');

    let result = match cli.command {
        Commands::Analyze(args) => commands::analyze::execute(&client, url, cli.human, args).await,
        Commands::Corpus(args) => commands::corpus::execute(&client, url, cli.human, args).await,
        Commands::Health => commands::health::execute(&client, url, cli.human).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_defaults_and_overrides() {
        let cli = Cli::try_parse_from(["review", "health"]).unwrap();
        assert_eq!(cli.timeout, commands::DEFAULT_TIMEOUT_SECS);

        let cli = Cli::try_parse_from(["review", "--timeout", "20", "health"]).unwrap();
        assert_eq!(cli.timeout, 20);
    }
}
