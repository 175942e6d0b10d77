use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid product code `{input}`: must be {width} characters long", width = crate::domain::product::PRODUCT_CODE_WIDTH)]
    InvalidProductCode { input: String },
    #[error("catalog payload is missing `{path}`")]
    MissingField { path: String },
}

impl DomainError {
    pub fn missing_field(path: &str) -> Self {
        Self::MissingField { path: path.to_owned() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("catalog api returned status {status}")]
    Upstream { status: u16, message: Option<String> },
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Text safe to show in the chat channel.
    pub fn user_message(&self) -> String {
        match self {
            Self::Domain(DomainError::InvalidProductCode { .. }) => "Invalid code!".to_owned(),
            Self::Domain(DomainError::MissingField { .. }) => {
                "Could not read the product data returned by the API.".to_owned()
            }
            Self::Upstream { message: Some(message), .. } => message.clone(),
            Self::Upstream { message: None, .. } => {
                "Could not get successful response from API!".to_owned()
            }
            Self::Transport(_) => "An error has occurred sending the request!".to_owned(),
            Self::Configuration(_) => "The bot is misconfigured. Ask the owner to check its logs.".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError};

    #[test]
    fn invalid_code_maps_to_short_rejection() {
        let error = ApplicationError::from(DomainError::InvalidProductCode {
            input: "1234".to_owned(),
        });
        assert_eq!(error.user_message(), "Invalid code!");
    }

    #[test]
    fn upstream_message_is_surfaced_verbatim() {
        let error = ApplicationError::Upstream {
            status: 400,
            message: Some("Product with code '999999' not found!".to_owned()),
        };
        assert_eq!(error.user_message(), "Product with code '999999' not found!");
    }

    #[test]
    fn upstream_without_message_falls_back_to_generic_text() {
        let error = ApplicationError::Upstream { status: 502, message: None };
        assert_eq!(error.user_message(), "Could not get successful response from API!");
    }

    #[test]
    fn transport_failure_hides_the_underlying_error() {
        let error = ApplicationError::Transport("connection refused (10.0.0.1:443)".to_owned());
        assert_eq!(error.user_message(), "An error has occurred sending the request!");
        assert!(!error.user_message().contains("10.0.0.1"));
    }
}
