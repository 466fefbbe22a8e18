use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuideChatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Audit error: {0}")]
    Audit(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GuideChatError>;
