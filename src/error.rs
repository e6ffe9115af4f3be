use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("malformed session record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("malformed session log: {0}")]
    MalformedLog(String),

    #[error("invalid hourly rate: {0}")]
    InvalidRate(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error(transparent)]
    Settings(#[from] ::config::ConfigError),

    #[error(transparent)]
    Template(#[from] minijinja::Error),

    #[error(transparent)]
    Prompt(#[from] inquire::InquireError),
}

impl AppError {
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        AppError::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }
}
