//! Model Context Protocol surface over JSON-RPC 2.0.
//!
//! This module turns JSON-RPC messages into calls on the
//! [`CapabilityRegistry`](crate::registry::CapabilityRegistry) and back. The
//! same dispatcher serves the stdio loop in [`stdio`] and the `POST /mcp`
//! HTTP handler.

pub mod dispatch;
pub mod stdio;
pub mod types;

pub use dispatch::{dispatch, handle, INSTRUCTIONS, SUPPORTED_PROTOCOL_VERSIONS};
pub use types::{parse_message, JsonRpcRequest, JsonRpcResponse, RpcError};

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
/// MCP's code for an unknown resource URI.
pub const RESOURCE_NOT_FOUND: i64 = -32002;
