//! Checkout error types.

use thiserror::Error;

/// Message shown when the order endpoint rejects an order without saying why.
pub const ORDER_FAILED_FALLBACK: &str = "Failed to place order";

/// Message shown when the order request never got a response.
pub const TRANSPORT_FAILED_FALLBACK: &str = "Something went wrong";

/// Errors that can occur during checkout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// No usable credential; no request was sent.
    #[error("Please log in to place an order")]
    Unauthorized,

    /// The order endpoint answered with a non-success status.
    #[error("{message}")]
    Rejected { message: String },

    /// The order request failed before a response arrived.
    #[error("Order request failed: {0}")]
    Transport(String),

    /// Nothing in the cart matches a catalog record.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Another submission is still in flight.
    #[error("An order is already being submitted")]
    AlreadySubmitting,
}

impl CheckoutError {
    /// Builds a rejection from an optional server message.
    pub fn rejected(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| ORDER_FAILED_FALLBACK.to_string());
        CheckoutError::Rejected { message }
    }

    /// Returns the text a user would see for this error.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Transport(_) => TRANSPORT_FAILED_FALLBACK.to_string(),
            other => other.to_string(),
        }
    }

    /// Returns true when retrying the same cart may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::Rejected { .. } | CheckoutError::Transport(_)
        )
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_keeps_server_message() {
        let err = CheckoutError::rejected(Some("Out of stock".to_string()));
        assert_eq!(err.user_message(), "Out of stock");
    }

    #[test]
    fn test_rejected_without_message_falls_back() {
        assert_eq!(
            CheckoutError::rejected(None).user_message(),
            ORDER_FAILED_FALLBACK
        );
        assert_eq!(
            CheckoutError::rejected(Some("  ".to_string())).user_message(),
            ORDER_FAILED_FALLBACK
        );
    }

    #[test]
    fn test_transport_hides_details_from_user() {
        let err = CheckoutError::Transport("connection reset".to_string());
        assert_eq!(err.user_message(), TRANSPORT_FAILED_FALLBACK);
        assert!(err.to_string().contains("connection reset"));
        assert!(err.is_retryable());
        assert!(!CheckoutError::EmptyCart.is_retryable());
    }
}
