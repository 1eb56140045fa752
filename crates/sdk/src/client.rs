//! CCTV Request Service Client

use crate::error::{Result, SdkError};
use crate::types::{
    GetRequest, ListRequest, ListResponse, RequestDraft, StatsRequest, StatsResponse,
    SubmitResponse, TrackRequest, TrackResponse, UpdateStatusRequest, UpdateStatusResponse,
};
use cctv_core::domain::{Request, RequestStatus};
use cctv_core::port::RequestFilter;
use jsonrpsee::core::client::{ClientT, Subscription, SubscriptionClientT};
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Large enough for a submission with every attachment at its size cap
const MAX_REQUEST_SIZE: u32 = 128 * 1024 * 1024;
const MAX_RESPONSE_SIZE: u32 = 32 * 1024 * 1024;

/// Client for the request service
///
/// # Example
///
/// ```no_run
/// use cctv_sdk::CctvClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CctvClient::connect("http://127.0.0.1:9530").await?;
/// let request = client.track("REQ-20240501-4242").await?;
/// println!("{}: {}", request.tracking_id, request.status);
/// # Ok(())
/// # }
/// ```
pub struct CctvClient {
    client: HttpClient,
    url: String,
    staff_token: Option<String>,
}

impl CctvClient {
    /// Connect to the request service
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9530`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        // Submissions carry base64 attachments; the timeout covers their upload
        let client = HttpClientBuilder::default()
            .request_timeout(REQUEST_TIMEOUT)
            .max_request_size(MAX_REQUEST_SIZE)
            .max_response_size(MAX_RESPONSE_SIZE)
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
            staff_token: None,
        })
    }

    /// Attach the staff token sent with staff methods
    pub fn with_staff_token(mut self, token: impl Into<String>) -> Self {
        self.staff_token = Some(token.into());
        self
    }

    /// Submit a public request; returns the tracking ID to show the citizen
    pub async fn submit(&self, draft: RequestDraft) -> Result<SubmitResponse> {
        let response: SubmitResponse = self
            .client
            .request("request.submit.v1", rpc_params![draft])
            .await?;
        Ok(response)
    }

    /// Public status lookup
    pub async fn track(&self, tracking_id: impl Into<String>) -> Result<TrackResponse> {
        let request = TrackRequest {
            tracking_id: tracking_id.into(),
        };
        let response: TrackResponse = self
            .client
            .request("request.track.v1", rpc_params![request])
            .await?;
        Ok(response)
    }

    /// Staff status change
    ///
    /// `note: None` records the default note.
    pub async fn update_status(
        &self,
        id: impl Into<String>,
        status: RequestStatus,
        note: Option<String>,
    ) -> Result<UpdateStatusResponse> {
        let request = UpdateStatusRequest {
            staff_token: self.staff_token.clone(),
            id: id.into(),
            status,
            note,
        };
        let response: UpdateStatusResponse = self
            .client
            .request("request.update_status.v1", rpc_params![request])
            .await?;
        Ok(response)
    }

    /// Staff fetch by store ID
    pub async fn get(&self, id: impl Into<String>) -> Result<Request> {
        let request = GetRequest {
            staff_token: self.staff_token.clone(),
            id: id.into(),
        };
        let response: Request = self
            .client
            .request("request.get.v1", rpc_params![request])
            .await?;
        Ok(response)
    }

    /// Dashboard listing, newest first
    pub async fn list(&self, filter: RequestFilter) -> Result<Vec<Request>> {
        let request = ListRequest {
            staff_token: self.staff_token.clone(),
            filter,
        };
        let response: ListResponse = self
            .client
            .request("request.list.v1", rpc_params![request])
            .await?;
        Ok(response.requests)
    }

    pub async fn stats(&self) -> Result<StatsResponse> {
        let request = StatsRequest {
            staff_token: self.staff_token.clone(),
        };
        let response: StatsResponse = self
            .client
            .request("admin.stats.v1", rpc_params![request])
            .await?;
        Ok(response)
    }

    /// Live dashboard feed over WebSocket
    ///
    /// Yields the current list first, then the full list again after every
    /// write on the server.
    pub async fn watch(&self, filter: RequestFilter) -> Result<DashboardWatch> {
        let ws_client = WsClientBuilder::default()
            .max_response_size(MAX_RESPONSE_SIZE)
            .build(ws_url(&self.url))
            .await
            .map_err(|e| SdkError::Connection(format!("WebSocket connect failed: {}", e)))?;

        let request = ListRequest {
            staff_token: self.staff_token.clone(),
            filter,
        };
        let subscription = ws_client
            .subscribe(
                "request.watch.v1",
                rpc_params![request],
                "request.unwatch.v1",
            )
            .await?;

        Ok(DashboardWatch {
            _client: ws_client,
            subscription,
        })
    }
}

/// An open `request.watch.v1` subscription
///
/// Owns its WebSocket client; dropping it unsubscribes.
pub struct DashboardWatch {
    _client: WsClient,
    subscription: Subscription<ListResponse>,
}

impl DashboardWatch {
    /// Next full list; `None` once the server closes the feed
    pub async fn next(&mut self) -> Option<Result<Vec<Request>>> {
        let item = self.subscription.next().await?;
        Some(item.map(|list| list.requests).map_err(SdkError::from))
    }
}

/// Same host and port, WebSocket scheme
fn ws_url(http_url: &str) -> String {
    if let Some(rest) = http_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = http_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        http_url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url() {
        assert_eq!(ws_url("http://127.0.0.1:9530"), "ws://127.0.0.1:9530");
        assert_eq!(ws_url("https://cctv.example"), "wss://cctv.example");
        assert_eq!(ws_url("ws://127.0.0.1:9530"), "ws://127.0.0.1:9530");
    }

    #[tokio::test]
    async fn test_connect_does_not_dial() {
        // HTTP client construction is lazy
        let client = CctvClient::connect("http://127.0.0.1:1").await.unwrap();
        assert!(client.staff_token.is_none());
        let client = client.with_staff_token("s3cret");
        assert_eq!(client.staff_token.as_deref(), Some("s3cret"));
    }
}
