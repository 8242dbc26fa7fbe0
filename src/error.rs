use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookbotError {
    #[error("Failed to read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Not logged in.\n\nRun `bookbot login` first.")]
    NotLoggedIn,

    #[error("Chapter file is empty: {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
