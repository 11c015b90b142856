//! Host error type. Everything fallible in the binary funnels into [`HostError`].

use canvas::error::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("invalid value for {var}: {value:?}")]
    Config { var: &'static str, value: String },
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("script event {index}: {message}")]
    Script { index: usize, message: String },
}
