use crate::config::Config;
use crate::content::ContentStore;
use crate::error::Result;
use crate::persistence::FeedbackSink;
use crate::registry::CapabilityRegistry;
use crate::tools::build_registry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Application state shared by every transport.
///
/// Everything here is built once and then only read; the feedback sink
/// serializes its own writes.
pub struct AppState {
    pub registry: CapabilityRegistry,
    pub feedback: Arc<FeedbackSink>,
    /// Hex SHA-256 of the loaded knowledge base.
    pub content_fingerprint: String,
    /// Set once a transport is accepting requests, cleared when draining.
    pub ready: AtomicBool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Load content, open the feedback log and register every capability.
    ///
    /// Any missing or unreadable content, or a registration conflict, fails here
    /// so no partial registry is ever exposed.
    pub fn new(config: Config) -> Result<Self> {
        let store = match &config.knowledge_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "Loading knowledge base from disk");
                ContentStore::from_dir(dir)?
            }
            None => {
                tracing::info!("Using embedded knowledge base");
                ContentStore::embedded()?
            }
        };
        let content_fingerprint = store.fingerprint();
        tracing::info!(
            entries = store.len(),
            fingerprint = %content_fingerprint,
            "Content store loaded"
        );

        let feedback = Arc::new(FeedbackSink::new(config.feedback_path.clone()));
        let registry = build_registry(Arc::new(store), Arc::clone(&feedback))?;

        Ok(Self {
            registry,
            feedback,
            content_fingerprint,
            ready: AtomicBool::new(false),
            config: Arc::new(config),
        })
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn mark_draining(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}
