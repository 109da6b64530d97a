use crate::config::ConfigError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Failed to hash admin password: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),

    #[error("Failed to render node config: {0}")]
    Render(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
