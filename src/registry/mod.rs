//! Capability registry: named resources and schema-validated tools.

pub mod capability;
pub mod schema;

pub use capability::{CapabilityRegistry, ResourceDescriptor, ToolDescriptor, ToolHandler, ToolOutput};
pub use schema::{FieldKind, FieldSpec, InputSchema, ItemKind, Literal, Presence, ValidatedInput};
