use std::path::PathBuf;

use regions::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("cannot read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize snippets: {0}")]
    Json(#[from] serde_json::Error),
}
