//! JSON-RPC Server
//!
//! HTTP and WebSocket on one TCP port. `request.watch.v1` needs WebSocket.

use crate::handler::RpcHandler;
use crate::rate_limiter::RateLimiter;
use crate::types::{
    GetRequest, ListRequest, StatsRequest, SubmitRequest, TrackRequest, UpdateStatusRequest,
};
use cctv_core::application::{AttachmentLimits, RequestService};
use jsonrpsee::core::SubscriptionResult;
use jsonrpsee::server::{PendingSubscriptionSink, Server, ServerHandle, SubscriptionMessage};
use jsonrpsee::types::Params;
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9530;
const DEFAULT_RATE_LIMIT_BURST: u32 = 60;
const DEFAULT_RATE_LIMIT_PER_SEC: u32 = 10;
const DEFAULT_MAX_RESPONSE_BODY_SIZE: u32 = 32 * 1024 * 1024;

/// Room for the JSON envelope and the non-file fields of a submission
const BODY_HEADROOM: u64 = 1024 * 1024;

pub const WATCH_METHOD: &str = "request.watch.v1";
pub const WATCH_NOTIFICATION: &str = "request.changed";
pub const UNWATCH_METHOD: &str = "request.unwatch.v1";

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    /// 0 binds an ephemeral port
    pub port: u16,
    pub staff_token: Option<String>,
    pub rate_limit_burst: u32,
    pub rate_limit_per_sec: u32,
    /// Largest accepted HTTP/WebSocket request, in bytes
    pub max_request_body_size: u32,
    pub max_response_body_size: u32,
}

/// Request body size that fits a full submission under the given limits
///
/// Files travel base64 encoded, so each one grows by a third.
pub fn request_body_limit(limits: &AttachmentLimits) -> u32 {
    let per_file = (limits.max_bytes as u64).div_ceil(3).saturating_mul(4);
    let total = per_file
        .saturating_mul(limits.max_files as u64)
        .saturating_add(BODY_HEADROOM);
    u32::try_from(total).unwrap_or(u32::MAX)
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            staff_token: None,
            rate_limit_burst: DEFAULT_RATE_LIMIT_BURST,
            rate_limit_per_sec: DEFAULT_RATE_LIMIT_PER_SEC,
            max_request_body_size: request_body_limit(&AttachmentLimits::default()),
            max_response_body_size: DEFAULT_MAX_RESPONSE_BODY_SIZE,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, service: Arc<RequestService>) -> Self {
        let handler = RpcHandler::new(
            service,
            config.staff_token.clone(),
            RateLimiter::new(config.rate_limit_burst, config.rate_limit_per_sec),
        );

        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Start the JSON-RPC server, returning the bound address and its handle
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .max_request_body_size(self.config.max_request_body_size)
            .max_response_body_size(self.config.max_response_body_size)
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = build_module(self.handler)?;

        info!(
            addr = %local_addr,
            max_request_body_size = self.config.max_request_body_size,
            "JSON-RPC server started"
        );

        Ok((local_addr, server.start(module)))
    }
}

/// Register every method on a fresh module
pub fn build_module(handler: Arc<RpcHandler>) -> Result<RpcModule<()>, String> {
    let mut module = RpcModule::new(());

    // Public
    let h = handler.clone();
    module.register_async_method("request.submit.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: SubmitRequest = params.one()?;
            h.submit(req).await
        }
    })
    .map_err(|e| e.to_string())?;

    let h = handler.clone();
    module.register_async_method("request.track.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: TrackRequest = params.one()?;
            h.track(req).await
        }
    })
    .map_err(|e| e.to_string())?;

    // Staff
    let h = handler.clone();
    module.register_async_method("request.update_status.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: UpdateStatusRequest = params.one()?;
            h.update_status(req).await
        }
    })
    .map_err(|e| e.to_string())?;

    let h = handler.clone();
    module.register_async_method("request.get.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: GetRequest = params.one()?;
            h.get(req).await
        }
    })
    .map_err(|e| e.to_string())?;

    let h = handler.clone();
    module.register_async_method("request.list.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: ListRequest = params.one()?;
            h.list(req).await
        }
    })
    .map_err(|e| e.to_string())?;

    let h = handler.clone();
    module.register_async_method("admin.stats.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: StatsRequest = params.one()?;
            h.stats(req).await
        }
    })
    .map_err(|e| e.to_string())?;

    let h = handler;
    module.register_subscription(
        WATCH_METHOD,
        WATCH_NOTIFICATION,
        UNWATCH_METHOD,
        move |params, pending, _, _| {
            let h = h.clone();
            async move { watch(h, params, pending).await }
        },
    )
    .map_err(|e| e.to_string())?;

    Ok(module)
}

/// Live dashboard feed: the full filtered list now, then again after every write
async fn watch(
    handler: Arc<RpcHandler>,
    params: Params<'static>,
    pending: PendingSubscriptionSink,
) -> SubscriptionResult {
    let req: ListRequest = match params.one() {
        Ok(req) => req,
        Err(e) => {
            pending.reject(e).await;
            return Ok(());
        }
    };
    if let Err(e) = handler.authorize(req.staff_token.as_deref()) {
        pending.reject(e).await;
        return Ok(());
    }

    // Subscribe before the first query so no write slips between the two
    let mut changes = handler.subscribe();
    let sink = pending.accept().await?;
    debug!("Dashboard watcher connected");

    let snapshot = handler.list_unchecked(&req.filter).await?;
    sink.send(SubscriptionMessage::from_json(&snapshot)?).await?;

    loop {
        tokio::select! {
            _ = sink.closed() => break,
            change = changes.recv() => {
                match change {
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Dashboard watcher lagged, sending fresh list");
                    }
                    Err(RecvError::Closed) => break,
                }

                let snapshot = match handler.list_unchecked(&req.filter).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!(error = %e.message(), "Dashboard re-query failed");
                        continue;
                    }
                };
                sink.send(SubscriptionMessage::from_json(&snapshot)?).await?;
            }
        }
    }

    debug!("Dashboard watcher disconnected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RpcServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9530);
        assert!(config.staff_token.is_none());
        assert!(config.max_request_body_size > 10 * 1024 * 1024);
    }

    #[test]
    fn test_request_body_limit_fits_encoded_files() {
        let limits = AttachmentLimits {
            max_bytes: 3 * 1024 * 1024,
            max_files: 2,
        };
        assert_eq!(
            request_body_limit(&limits),
            2 * 4 * 1024 * 1024 + BODY_HEADROOM as u32
        );

        let huge = AttachmentLimits {
            max_bytes: usize::MAX,
            max_files: 8,
        };
        assert_eq!(request_body_limit(&huge), u32::MAX);
    }
}
