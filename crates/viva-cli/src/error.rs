use std::path::PathBuf;

use thiserror::Error;
use viva_core::{ApiError, ConfigError, ContextError, StorageError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to read {}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend answered 2xx but reported a failure in its envelope.
    #[error("backend reported failure: {0}")]
    Backend(String),

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}
