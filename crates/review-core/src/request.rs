//! Outbound request and raw inbound response for the language service.

use serde::Serialize;

use crate::text::ReviewText;

/// Version of the response contract described in the prompt. Bumped whenever
/// field names or enumerations change.
pub const SCHEMA_VERSION: u32 = 1;

/// A fully built, immutable request to the language service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    text: ReviewText,
    schema_version: u32,
    prompt: String,
    response_schema: serde_json::Value,
}

impl AnalysisRequest {
    pub fn new(
        text: ReviewText,
        schema_version: u32,
        prompt: String,
        response_schema: serde_json::Value,
    ) -> Self {
        Self {
            text,
            schema_version,
            prompt,
            response_schema,
        }
    }

    pub fn text(&self) -> &ReviewText {
        &self.text
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Complete prompt, review included.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// JSON Schema of the expected response, for providers that accept one.
    pub fn response_schema(&self) -> &serde_json::Value {
        &self.response_schema
    }
}

/// Opaque text returned by the language service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    body: String,
    model: String,
}

impl RawResponse {
    pub fn new(body: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            model: model.into(),
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Model that produced the response.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn into_body(self) -> String {
        self.body
    }
}
