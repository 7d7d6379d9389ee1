use thiserror::Error;

use crate::types::TabId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Tab not found: {0}")]
    TabNotFound(TabId),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl Error {
    /// Errors caused by acting on a snapshot that no longer matches the
    /// browser (a tab closed or moved between read and write).
    pub fn is_stale_reference(&self) -> bool {
        matches!(self, Error::TabNotFound(_) | Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
