use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading the article/question documents. All of them are
/// fatal: the game refuses to start on partial data.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid game data: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("selected article {0} is missing from the loaded data")]
    MissingArticle(String),
}
