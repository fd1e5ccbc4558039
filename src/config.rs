use std::env;
use std::path::PathBuf;

/// How the server talks to its host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout. Used when launched by a desktop host.
    Stdio,
    /// JSON-RPC over `POST /mcp`, plus health, readiness and metrics endpoints.
    Http,
}

impl Transport {
    pub fn from_env() -> Self {
        match env::var("NVC_TRANSPORT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "http" | "streamable-http" | "server" => Self::Http,
            _ => Self::Stdio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match env::var("NVC_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    /// When set, knowledge files are read from this directory instead of the embedded copies.
    pub knowledge_dir: Option<PathBuf>,
    /// Location of the append-only feedback log.
    pub feedback_path: PathBuf,
    pub shutdown_timeout_secs: u64,
    /// Maximum accepted HTTP request body.
    pub max_body_bytes: usize,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            transport: Transport::from_env(),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            knowledge_dir: env::var("NVC_KNOWLEDGE_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            feedback_path: PathBuf::from(
                env::var("NVC_FEEDBACK_PATH").unwrap_or_else(|_| "feedback.json".to_string()),
            ),
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| "1048576".to_string())
                .parse()?,
            log_format: LogFormat::from_env(),
        })
    }

    /// Configuration for in-process use: embedded knowledge, feedback log at `feedback_path`.
    pub fn embedded(feedback_path: impl Into<PathBuf>) -> Self {
        Self {
            transport: Transport::Stdio,
            host: "127.0.0.1".to_string(),
            port: 8080,
            knowledge_dir: None,
            feedback_path: feedback_path.into(),
            shutdown_timeout_secs: 5,
            max_body_bytes: 1024 * 1024,
            log_format: LogFormat::Text,
        }
    }
}
