use crate::error::ErrorKind;
use crate::geo::Crs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Non-finite input coordinate ({0}, {1})")]
    NonFinite(f64, f64),

    #[error("Coordinate ({x}, {y}) lies outside the domain of {crs}")]
    OutOfDomain { crs: Crs, x: f64, y: f64 },
}

impl ProjectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProjectionError::NonFinite(..) => ErrorKind::Parse,
            ProjectionError::OutOfDomain { .. } => ErrorKind::Structure,
        }
    }
}
