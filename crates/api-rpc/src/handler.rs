//! RPC Method Handlers
//!
//! Thin layer over `RequestService`: rate limiting for public methods,
//! staff token checks for the rest, and error code mapping.

use crate::error::{throttled, to_rpc_error, unauthorized};
use crate::rate_limiter::RateLimiter;
use crate::types::{
    GetRequest, ListRequest, ListResponse, StatsRequest, StatsResponse, SubmitRequest,
    SubmitResponse, TrackRequest, TrackResponse, UpdateStatusRequest, UpdateStatusResponse,
};
use cctv_core::application::{RequestChange, RequestService};
use cctv_core::domain::{Request, RequestStatus};
use cctv_core::port::RequestFilter;
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    service: Arc<RequestService>,
    staff_token: Option<String>,
    rate_limiter: RateLimiter,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(
        service: Arc<RequestService>,
        staff_token: Option<String>,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            service,
            // An empty configured token means "no token"
            staff_token: staff_token.filter(|t| !t.is_empty()),
            rate_limiter,
            start_time: std::time::Instant::now(),
        }
    }

    fn check_rate(&self) -> Result<(), ErrorObjectOwned> {
        if self.rate_limiter.try_acquire() {
            Ok(())
        } else {
            Err(throttled())
        }
    }

    /// Staff methods are open when no token is configured
    pub fn authorize(&self, presented: Option<&str>) -> Result<(), ErrorObjectOwned> {
        match &self.staff_token {
            None => Ok(()),
            Some(expected) if presented == Some(expected.as_str()) => Ok(()),
            Some(_) => {
                debug!("Staff call rejected");
                Err(unauthorized())
            }
        }
    }

    /// request.submit.v1
    pub async fn submit(&self, params: SubmitRequest) -> Result<SubmitResponse, ErrorObjectOwned> {
        self.check_rate()?;

        let tracking_id = self.service.submit(params).await.map_err(to_rpc_error)?;

        Ok(SubmitResponse {
            tracking_id,
            status: RequestStatus::Pending,
        })
    }

    /// request.track.v1
    pub async fn track(&self, params: TrackRequest) -> Result<TrackResponse, ErrorObjectOwned> {
        self.check_rate()?;

        let request = self
            .service
            .lookup(&params.tracking_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(request.into())
    }

    /// request.update_status.v1
    pub async fn update_status(
        &self,
        params: UpdateStatusRequest,
    ) -> Result<UpdateStatusResponse, ErrorObjectOwned> {
        self.authorize(params.staff_token.as_deref())?;

        let entry = self
            .service
            .update_status(params.id.clone(), params.status, params.note)
            .await
            .map_err(to_rpc_error)?;

        Ok(UpdateStatusResponse {
            id: params.id,
            entry,
        })
    }

    /// request.get.v1
    pub async fn get(&self, params: GetRequest) -> Result<Request, ErrorObjectOwned> {
        self.authorize(params.staff_token.as_deref())?;

        self.service.get(&params.id).await.map_err(to_rpc_error)
    }

    /// request.list.v1
    pub async fn list(&self, params: ListRequest) -> Result<ListResponse, ErrorObjectOwned> {
        self.authorize(params.staff_token.as_deref())?;

        self.list_unchecked(&params.filter).await
    }

    /// Listing without the token check (watch re-queries after authorizing once)
    pub(crate) async fn list_unchecked(
        &self,
        filter: &RequestFilter,
    ) -> Result<ListResponse, ErrorObjectOwned> {
        let requests = self.service.list(filter).await.map_err(to_rpc_error)?;
        Ok(ListResponse { requests })
    }

    /// admin.stats.v1
    pub async fn stats(&self, params: StatsRequest) -> Result<StatsResponse, ErrorObjectOwned> {
        self.authorize(params.staff_token.as_deref())?;

        let stats = self.service.stats().await.map_err(to_rpc_error)?;

        Ok(StatsResponse {
            total: stats.total,
            by_status: stats.by_status,
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<RequestChange> {
        self.service.subscribe()
    }
}
