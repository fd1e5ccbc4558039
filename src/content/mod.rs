//! Static NVC knowledge base.
//!
//! Every entry is loaded exactly once at startup, either from the copies
//! embedded in the binary or from a knowledge directory on disk, and is
//! read-only for the rest of the process lifetime.

pub mod embedded;
pub mod store;

pub use store::{ContentEntry, ContentKey, ContentSource, ContentStore, MimeKind};
