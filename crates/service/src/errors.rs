use models::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("poll {0} not found")]
    NotFound(u64),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid vote option: {0}")]
    InvalidOption(usize),
    #[error("store read error: {0}")]
    StoreRead(String),
    #[error("store write error: {0}")]
    StoreWrite(String),
}

impl ServiceError {
    pub fn read(e: impl std::fmt::Display) -> Self { Self::StoreRead(e.to_string()) }
    pub fn write(e: impl std::fmt::Display) -> Self { Self::StoreWrite(e.to_string()) }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => Self::InvalidInput(msg),
            ModelError::InvalidOption(slot) => Self::InvalidOption(slot),
        }
    }
}
