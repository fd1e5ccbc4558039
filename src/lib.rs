//! NVC server - Nonviolent Communication tools and knowledge over MCP
//!
//! This library exposes the content store, capability registry, prompt
//! renderers and feedback sink behind the server binary, enabling
//! integration tests and embedding in other hosts.

pub mod config;
pub mod content;
pub mod error;
pub mod handlers;
pub mod persistence;
pub mod prompts;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod tools;

// Re-export key types for convenience
pub use config::{Config, LogFormat, Transport};
pub use content::{ContentKey, ContentStore};
pub use error::{AppError, Result};
pub use handlers::{health_handler, mcp_handler, ready_handler, resource_handler};
pub use persistence::{FeedbackEntry, FeedbackSink};
pub use registry::CapabilityRegistry;
pub use state::AppState;
