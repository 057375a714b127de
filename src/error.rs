use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("approval policy error: {0}")]
    Policy(String),

    #[error("repo format error: {0}")]
    RepoFormat(String),

    #[error("phrase pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("tracker error: {0}")]
    Tracker(String),

    #[error("timed out waiting for approval")]
    Timeout,

    #[error("interrupted")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, Error>;
