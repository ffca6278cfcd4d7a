//! HEALTH command - Show server and corpus status.

use anyhow::Result;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, make_request, output};

/// Response from GET /health.
#[derive(Debug, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub corpus: CorpusStatus,
    pub version: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CorpusStatus {
    NotLoaded,
    Ready { reviews: u64 },
    Unavailable { reason: String },
}

impl HumanReadable for HealthResponse {
    fn print_human(&self) {
        let status = if self.status == "ok" {
            self.status.green().bold()
        } else {
            self.status.yellow().bold()
        };
        println!("{} {}", "Status:".cyan(), status);
        println!("{} {}", "Version:".cyan(), self.version);

        match &self.corpus {
            CorpusStatus::NotLoaded => println!("{} loading", "Corpus:".cyan()),
            CorpusStatus::Ready { reviews } => {
                println!("{} {} reviews", "Corpus:".cyan(), reviews)
            }
            CorpusStatus::Unavailable { reason } => {
                println!("{} {} ({})", "Corpus:".cyan(), "unavailable".red(), reason)
            }
        }
    }
}

/// Execute the health command.
pub async fn execute(client: &reqwest::Client, base_url: &str, human: bool) -> Result<()> {
    let url = format!("{}/health", base_url);

    let response: HealthResponse = make_request(client.get(&url)).await?;

    output(&response, human)
}
