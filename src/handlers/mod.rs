pub mod health;
pub mod mcp;
pub mod resources;

pub use health::{health_handler, ready_handler};
pub use mcp::mcp_handler;
pub use resources::resource_handler;
