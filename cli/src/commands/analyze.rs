//! ANALYZE command - Analyze one review.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use review_core::{AnalysisResult, ChartData, ComparisonReport, Sentiment};
use serde::{Deserialize, Serialize};

use super::{HumanReadable, bar, make_request, output, percent, truncate};

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Review text (reads stdin when omitted and no --file is given)
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the review from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest {
    text: String,
}

/// Response from POST /analyze.
#[derive(Debug, Deserialize, Serialize)]
pub struct AnalyzeResponse {
    pub review: ReviewInfo,
    pub result: AnalysisResult,
    pub comparison: Option<ComparisonReport>,
    pub chart: ChartData,
    pub model: String,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReviewInfo {
    pub text: String,
    pub truncated: bool,
    pub original_chars: usize,
    pub quality: QualityInfo,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QualityInfo {
    pub word_count: usize,
    pub quality_score: f64,
    pub is_substantive: bool,
}

fn colored_sentiment(sentiment: Sentiment) -> String {
    match sentiment {
        Sentiment::Positive => sentiment.as_str().green().bold().to_string(),
        Sentiment::Neutral => sentiment.as_str().yellow().bold().to_string(),
        Sentiment::Negative => sentiment.as_str().red().bold().to_string(),
    }
}

impl HumanReadable for AnalyzeResponse {
    fn print_human(&self) {
        let result = &self.result;

        println!("{}", "Review Analysis".green().bold());
        println!("{}", "=".repeat(60));
        println!();
        println!("  {} {}", "Review:".cyan(), truncate(&self.review.text, 70));
        if self.review.truncated {
            println!(
                "  {} {} chars, analyzed a prefix",
                "Truncated:".yellow(),
                self.review.original_chars
            );
        }
        if !self.review.quality.is_substantive {
            println!("  {} review is very short", "Note:".yellow());
        }
        println!(
            "  {} {} ({:.0}% confident)",
            "Sentiment:".cyan(),
            colored_sentiment(result.overall_sentiment),
            result.confidence * 100.0
        );
        if let Some(overall) = result.overall_confidence {
            println!("  {} {:.2}", "Evidence-weighted:".cyan(), overall);
        }
        if result.was_repaired {
            println!("  {} response needed repair", "Note:".yellow());
        }
        println!("  {} {}", "Model:".cyan(), self.model);

        if !result.summary.is_empty() {
            println!();
            println!("{}", "Summary:".yellow());
            println!("  {}", result.summary);
        }

        if !result.ranked_aspects.is_empty() {
            println!();
            println!("{}", "Aspects:".yellow());
            for aspect in &result.ranked_aspects {
                let Some(assessment) = result.aspects.get(*aspect) else {
                    continue;
                };
                let score = result.aspect_score(*aspect);
                println!(
                    "  {:<18} {:<9} {:>5.2} {}",
                    aspect.display_name(),
                    assessment.sentiment.as_str(),
                    score,
                    bar(score, 20)
                );
                for phrase in &assessment.evidence_phrases {
                    println!("  {:<18} \"{}\"", "", truncate(phrase, 50).dimmed());
                }
            }
        }

        if !result.dominant_emotions.is_empty() {
            println!();
            println!("{}", "Emotions:".yellow());
            for emotion in &result.dominant_emotions {
                let intensity = result.emotions.get(emotion).copied().unwrap_or_default();
                println!(
                    "  {:<16} {:>4.2} {}",
                    emotion.as_str(),
                    intensity,
                    bar(intensity, 20)
                );
            }
        }

        if !result.key_phrases.is_empty() {
            println!();
            println!("{}", "Key Phrases:".yellow());
            for phrase in &result.key_phrases {
                println!("  - {}", phrase);
            }
        }

        println!();
        match &self.comparison {
            Some(report) => {
                println!("{}", "Corpus Comparison:".yellow());
                println!(
                    "  {} {} ({})",
                    "Corpus majority:".cyan(),
                    report.corpus_majority.as_str(),
                    if report.matches_corpus_majority {
                        "matches".green()
                    } else {
                        "differs".red()
                    }
                );
                println!(
                    "  {} {} of {} reviews ({})",
                    "Same sentiment:".cyan(),
                    report.same_sentiment_count,
                    report.corpus_size,
                    percent(report.same_sentiment_share)
                );
                println!(
                    "  {} {} ({})",
                    "Percentile:".cyan(),
                    percent(report.sentiment_percentile),
                    report.boundary
                );
                for (aspect, delta) in &report.aspect_deltas {
                    println!(
                        "  {:<18} {:>+6.2} vs corpus",
                        aspect.display_name(),
                        delta
                    );
                }
            }
            None => {
                println!(
                    "{} corpus unavailable, comparison skipped",
                    "Degraded:".yellow()
                );
            }
        }
    }
}

fn read_review(args: &AnalyzeArgs) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read review from stdin")?;
    Ok(text)
}

/// Execute the analyze command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: AnalyzeArgs,
) -> Result<()> {
    let text = read_review(&args)?;
    let url = format!("{}/analyze", base_url);

    let response: AnalyzeResponse =
        make_request(client.post(&url).json(&AnalyzeRequest { text })).await?;

    output(&response, human)
}
