use crate::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("Malformed grid cell id '{id}': {reason}")]
    InvalidId { id: String, reason: &'static str },
}

impl GridError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GridError::InvalidId { .. } => ErrorKind::Parse,
        }
    }
}
