use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BcError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(
        "Prompt too large: estimated {estimated} tokens exceeds the {available}-token budget \
         by {excess} (model {model}, limit {ceiling})"
    )]
    BudgetExceeded {
        estimated: usize,
        available: usize,
        excess: usize,
        model: String,
        ceiling: usize,
    },

    #[error("API key file not found: {}", .0.display())]
    CredentialMissing(PathBuf),

    #[error("API request failed: {0}")]
    TransportError(String),

    #[error("{0}")]
    ProviderError(String),

    #[error("Failed to read file '{}': {reason}", path.display())]
    AttachmentReadError { path: PathBuf, reason: String },

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("User cancelled")]
    UserCancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML serialization/deserialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    TomlError(String),
}

pub type Result<T> = std::result::Result<T, BcError>;
