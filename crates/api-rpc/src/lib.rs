//! JSON-RPC API Layer
//!
//! JSON-RPC 2.0 server (HTTP + WebSocket) for the CCTV request service.
//! Public methods are rate limited; staff methods require the staff token
//! when one is configured.

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use jsonrpsee::server::ServerHandle;
pub use server::{request_body_limit, RpcServer, RpcServerConfig};
