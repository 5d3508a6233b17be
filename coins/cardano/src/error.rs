use adalens_provider::ProviderError;
use thiserror::Error;

use crate::quantity::QuantityError;

#[derive(Error, Debug)]
pub enum CardanoError {
    #[error("Invalid address format '{address}': {reason}")]
    InvalidAddressFormat { address: String, reason: String },

    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("Remote API error: status={status_code}, message={message}")]
    RemoteApi { status_code: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Malformed quantity '{value}': expected a non-negative base-10 integer")]
    MalformedQuantity { value: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for lookup operations
pub type Result<T> = std::result::Result<T, CardanoError>;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    InvalidAddressFormat = 1001,
    AddressNotFound = 1002,
    MalformedQuantity = 2003,
    InvalidQuery = 3006,
    RemoteApi = 4002,
    Network = 4005,
    MalformedResponse = 4006,
    InvalidConfig = 9002,
}

impl CardanoError {
    pub(crate) fn invalid_address(address: &str, reason: impl Into<String>) -> Self {
        CardanoError::InvalidAddressFormat {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Maps a gateway error for a lookup keyed by `address`, turning a 404
    /// into [`CardanoError::AddressNotFound`].
    pub(crate) fn for_address(address: &str, err: ProviderError) -> Self {
        if err.is_not_found() {
            CardanoError::AddressNotFound(address.to_string())
        } else {
            err.into()
        }
    }

    /// Returns the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            CardanoError::InvalidAddressFormat { .. } => ErrorCode::InvalidAddressFormat,
            CardanoError::AddressNotFound(_) => ErrorCode::AddressNotFound,
            CardanoError::RemoteApi { .. } => ErrorCode::RemoteApi,
            CardanoError::NetworkError(_) => ErrorCode::Network,
            CardanoError::MalformedResponse(_) => ErrorCode::MalformedResponse,
            CardanoError::MalformedQuantity { .. } => ErrorCode::MalformedQuantity,
            CardanoError::InvalidQuery(_) => ErrorCode::InvalidQuery,
            CardanoError::InvalidConfig(_) => ErrorCode::InvalidConfig,
        }
    }

    /// Transient failures a caller may retry
    pub fn is_retryable(&self) -> bool {
        match self {
            CardanoError::NetworkError(_) => true,
            CardanoError::RemoteApi { status_code, .. } => {
                matches!(status_code, 408 | 425 | 429 | 500..=599)
            }
            _ => false,
        }
    }

    /// Failures the user fixes by changing their input
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            CardanoError::InvalidAddressFormat { .. }
                | CardanoError::AddressNotFound(_)
                | CardanoError::InvalidQuery(_)
        )
    }
}

impl From<ProviderError> for CardanoError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Network(msg) => CardanoError::NetworkError(msg),
            ProviderError::RemoteApi { status_code, message } => {
                CardanoError::RemoteApi { status_code, message }
            }
            ProviderError::MalformedResponse(msg) => CardanoError::MalformedResponse(msg),
            ProviderError::InvalidUrl(msg) | ProviderError::InvalidConfig(msg) => {
                CardanoError::InvalidConfig(msg)
            }
        }
    }
}

impl From<QuantityError> for CardanoError {
    fn from(err: QuantityError) -> Self {
        CardanoError::MalformedQuantity { value: err.value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_address_not_found() {
        let err = ProviderError::RemoteApi {
            status_code: 404,
            message: "The requested component has not been found.".to_string(),
        };
        let mapped = CardanoError::for_address("addr_test1abc", err);
        assert!(matches!(mapped, CardanoError::AddressNotFound(ref a) if a == "addr_test1abc"));
        assert!(mapped.is_user_correctable());
    }

    #[test]
    fn test_other_remote_errors_pass_through() {
        let err = ProviderError::RemoteApi {
            status_code: 503,
            message: "Service Unavailable".to_string(),
        };
        let mapped = CardanoError::for_address("addr_test1abc", err);
        assert!(matches!(mapped, CardanoError::RemoteApi { status_code: 503, .. }));
        assert!(mapped.is_retryable());
    }

    #[test]
    fn test_retryable() {
        assert!(CardanoError::NetworkError("reset".into()).is_retryable());
        assert!(CardanoError::RemoteApi { status_code: 429, message: "slow down".into() }.is_retryable());
        assert!(!CardanoError::RemoteApi { status_code: 400, message: "bad".into() }.is_retryable());
        assert!(!CardanoError::MalformedQuantity { value: "1.5".into() }.is_retryable());
    }

    #[test]
    fn test_error_code() {
        let err = CardanoError::invalid_address("", "empty");
        assert_eq!(err.code(), ErrorCode::InvalidAddressFormat);
        assert_eq!(CardanoError::from(QuantityError::new("x")).code(), ErrorCode::MalformedQuantity);
    }

    #[test]
    fn test_error_display() {
        let err = CardanoError::MalformedQuantity { value: "-7".to_string() };
        assert!(err.to_string().contains("-7"));
    }
}
