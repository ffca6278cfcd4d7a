//! review-engine: analysis pipeline stages for the review analyzer
//!
//! This crate provides:
//! - Prompt and schema construction for the language service
//! - Tolerant parsing of untrusted service output
//! - Aspect and emotion aggregation
//! - Corpus statistics with CSV ingestion
//! - Comparison against the corpus and chart data
//! - [`ReviewAnalyzer`], which chains the stages for one review
//!
//! Every stage except the gateway call is a pure, synchronous function.
//!
//! Owned by: agent-engine

pub mod aggregate;
pub mod chart;
pub mod corpus;
pub mod dataset;
pub mod lexicon;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod reconcile;
pub mod tokenize;

pub use aggregate::aggregate;
pub use chart::build_chart_data;
pub use corpus::{
    AspectBaseline, CorpusStatistics, CorpusSummary, DatasetError, DatasetRow, WordCount,
};
pub use dataset::{load_csv, parse_rating, read_rows};
pub use lexicon::detect_aspects;
pub use parser::{DEFAULT_CONFIDENCE, extract_json_object, parse_response};
pub use pipeline::{AnalyzerConfig, ReviewAnalysis, ReviewAnalyzer};
pub use prompt::build_request;
pub use reconcile::reconcile;
pub use tokenize::tokenize;
