//! Boundary trait for the external language service.

use std::future::Future;
use std::sync::Arc;

use crate::error::GatewayError;
use crate::request::{AnalysisRequest, RawResponse};

/// Sends an analysis request to a language service and returns its raw text.
///
/// Implementations own the network call, its timeout, and the mapping of
/// transport failures onto [`GatewayError`]. They must not mutate any state
/// shared with other requests. Dropping the returned future cancels the call.
pub trait AnalysisGateway: Send + Sync {
    fn send(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<RawResponse, GatewayError>> + Send;
}

impl<G: AnalysisGateway> AnalysisGateway for Arc<G> {
    fn send(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<RawResponse, GatewayError>> + Send {
        (**self).send(request)
    }
}

impl<G: AnalysisGateway + ?Sized> AnalysisGateway for &G {
    fn send(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<RawResponse, GatewayError>> + Send {
        (**self).send(request)
    }
}
