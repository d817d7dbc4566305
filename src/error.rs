use crate::air_quality::error::GridError;
use crate::fetch::error::FetchError;
use crate::geo::error::ProjectionError;
use crate::weather::error::GmlError;
use std::fmt;
use thiserror::Error;

/// Coarse classification shared by every error in this crate.
///
/// Callers that only care whether a source was unreachable, returned garbage,
/// or returned a well-formed document lacking the expected content can match
/// on this instead of on the individual error enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network failure or non-2xx status.
    Transport,
    /// Response was not valid JSON/XML, or a field was malformed.
    Parse,
    /// Response parsed, but an expected element or field was absent.
    Structure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Parse => write!(f, "parse"),
            ErrorKind::Structure => write!(f, "structure"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Gml(#[from] GmlError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

impl EnvironmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnvironmentError::Fetch(e) => e.kind(),
            EnvironmentError::Grid(e) => e.kind(),
            EnvironmentError::Gml(e) => e.kind(),
            EnvironmentError::Projection(e) => e.kind(),
        }
    }
}
