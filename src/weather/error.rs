use crate::error::ErrorKind;
use crate::geo::error::ProjectionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GmlError {
    #[error("Failed to parse XML")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed XML document: {0}")]
    Document(&'static str),

    #[error("Invalid station position '{0}'")]
    Coordinate(String),

    #[error("Invalid observation timestamp '{value}'")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Expected element {0} not found in document")]
    MissingElement(&'static str),

    #[error("Observation has no '{0}' field")]
    MissingField(&'static str),

    #[error("Failed to project station position")]
    Projection(#[from] ProjectionError),
}

impl GmlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GmlError::Xml(_)
            | GmlError::Document(_)
            | GmlError::Coordinate(_)
            | GmlError::Timestamp { .. } => ErrorKind::Parse,
            GmlError::MissingElement(_) | GmlError::MissingField(_) => ErrorKind::Structure,
            GmlError::Projection(e) => e.kind(),
        }
    }
}
