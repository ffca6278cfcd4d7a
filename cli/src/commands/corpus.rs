//! CORPUS command - Show corpus statistics.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use review_core::{Aspect, Sentiment};
use serde::{Deserialize, Serialize};

use super::{HumanReadable, bar, make_request, output, percent};

/// Arguments for the corpus command.
#[derive(Args)]
pub struct CorpusArgs {
    /// Number of most frequent words to show
    #[arg(short = 'n', long, default_value_t = 20)]
    pub top: usize,
}

/// Response from GET /corpus.
#[derive(Debug, Deserialize, Serialize)]
pub struct CorpusResponse {
    pub total_reviews: u64,
    pub sentiment_counts: BTreeMap<Sentiment, u64>,
    pub sentiment_distribution: BTreeMap<Sentiment, f64>,
    pub majority: Sentiment,
    pub aspect_baselines: BTreeMap<Aspect, AspectBaseline>,
    pub average_rating: Option<f64>,
    pub vocabulary_size: usize,
    pub top_words: Vec<WordCount>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AspectBaseline {
    pub mean_score: f64,
    pub samples: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

fn share_bar(sentiment: Sentiment, share: f64) -> String {
    let filled = "#".repeat((share.clamp(0.0, 1.0) * 30.0).round() as usize);
    match sentiment {
        Sentiment::Positive => filled.green().to_string(),
        Sentiment::Neutral => filled.yellow().to_string(),
        Sentiment::Negative => filled.red().to_string(),
    }
}

impl HumanReadable for CorpusResponse {
    fn print_human(&self) {
        println!("{}", "Corpus Statistics".green().bold());
        println!("{}", "=".repeat(60));
        println!();
        println!("  {} {}", "Reviews:".cyan(), self.total_reviews);
        println!("  {} {}", "Majority:".cyan(), self.majority.as_str());
        if let Some(rating) = self.average_rating {
            println!("  {} {:.2} / 5", "Average rating:".cyan(), rating);
        }
        println!("  {} {}", "Vocabulary:".cyan(), self.vocabulary_size);

        println!();
        println!("{}", "Sentiment Distribution:".yellow());
        for sentiment in Sentiment::ALL {
            let share = self
                .sentiment_distribution
                .get(&sentiment)
                .copied()
                .unwrap_or_default();
            let count = self
                .sentiment_counts
                .get(&sentiment)
                .copied()
                .unwrap_or_default();
            println!(
                "  {:<9} {:>7} {:>6} {}",
                sentiment.as_str(),
                percent(share),
                count,
                share_bar(sentiment, share)
            );
        }

        if !self.aspect_baselines.is_empty() {
            println!();
            println!("{}", "Aspect Baselines:".yellow());
            for (aspect, baseline) in &self.aspect_baselines {
                println!(
                    "  {:<18} {:>+5.2} ({} reviews) {}",
                    aspect.display_name(),
                    baseline.mean_score,
                    baseline.samples,
                    bar(baseline.mean_score, 20)
                );
            }
        }

        if !self.top_words.is_empty() {
            println!();
            println!("{}", "Top Words:".yellow());
            let width = self
                .top_words
                .iter()
                .map(|w| w.word.chars().count())
                .max()
                .unwrap_or(0);
            for word in &self.top_words {
                println!("  {:<width$} {}", word.word, word.count, width = width);
            }
        }
    }
}

/// Execute the corpus command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: CorpusArgs,
) -> Result<()> {
    let url = format!("{}/corpus?top={}", base_url, args.top);

    let response: CorpusResponse = make_request(client.get(&url)).await?;

    output(&response, human)
}
