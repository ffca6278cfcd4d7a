//! review-core: shared vocabulary for the review analyzer
//!
//! This crate provides:
//! - Closed label sets: [`Sentiment`], [`Aspect`], [`Emotion`]
//! - The central [`AnalysisResult`] entity and its aspect breakdown
//! - Review text preprocessing via [`ReviewText`]
//! - Request/response envelopes for the language service
//! - Comparison and chart output types
//! - The [`ReviewError`] taxonomy and the [`AnalysisGateway`] trait
//!
//! Owned by: agent-types

pub mod error;
pub mod gateway;
pub mod report;
pub mod request;
pub mod text;
pub mod types;

pub use error::{GatewayError, ReviewError, ReviewResult};
pub use gateway::AnalysisGateway;
pub use report::{ChartBucket, ChartData, ComparisonReport, PercentileBoundary, SentimentShare};
pub use request::{AnalysisRequest, RawResponse, SCHEMA_VERSION};
pub use text::{DEFAULT_MAX_CHARS, ReviewQuality, ReviewText};
pub use types::{
    AnalysisResult, Aspect, AspectAssessment, AspectBreakdown, Emotion, Sentiment, UnknownLabel,
};
