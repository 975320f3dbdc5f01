use cipher::CipherError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcryptError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("The user `{0}` already exists")]
    DuplicateUser(String),

    #[error("The user `{0}` not found")]
    NotFound(String),

    #[error("The private key of `{0}` does not match its public key")]
    KeyMismatch(String),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] config::ConfigError),
}
