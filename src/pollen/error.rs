use crate::error::ErrorKind;
use crate::fetch::error::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollenError {
    #[error("Failed to create pollen API client")]
    Client(#[from] FetchError),

    #[error("Error fetching data: {0}")]
    PollenFetch(#[source] FetchError),

    #[error("Error fetching translations: {0}")]
    TranslationsFetch(#[source] FetchError),
}

impl PollenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PollenError::Client(e) | PollenError::PollenFetch(e) | PollenError::TranslationsFetch(e) => {
                e.kind()
            }
        }
    }
}
