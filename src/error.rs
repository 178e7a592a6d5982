//! Domain errors callers may want to match on

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("output directory {0:?} does not exist, run the build first")]
    MissingOutputDir(PathBuf),

    #[error("{0:?} does not exist")]
    MissingIndex(PathBuf),

    #[error("posts directory not found: {0:?}")]
    MissingPostsDir(PathBuf),

    #[error("{0:?} is not inside a git repository")]
    NotAGitRepo(PathBuf),

    #[error("navigation data not found: {0:?}")]
    MissingNavFile(PathBuf),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
