use shelfcheck_core::{ApplicationError, DomainError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request to `{endpoint}` failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not decode response from `{endpoint}`: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("`{endpoint}` returned status {status}")]
    Upstream { endpoint: String, status: u16, message: Option<String> },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("stock lookup task for `{store}` did not complete: {reason}")]
    Task { store: String, reason: String },
    #[error("could not build http client: {0}")]
    Client(#[source] reqwest::Error),
}

impl From<CatalogError> for ApplicationError {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::Domain(error) => Self::Domain(error),
            CatalogError::Upstream { status, message, .. } => Self::Upstream { status, message },
            CatalogError::Transport { .. }
            | CatalogError::Decode { .. }
            | CatalogError::Task { .. } => Self::Transport(value.to_string()),
            CatalogError::Client(error) => Self::Configuration(error.to_string()),
        }
    }
}
