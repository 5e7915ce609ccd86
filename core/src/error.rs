//! Domain error types for the send flow.

use thiserror::Error;

/// Typed error enum for send-flow operations, allowing callers to match on
/// specific failure modes instead of inspecting opaque `anyhow::Error` messages.
#[derive(Debug, Error)]
pub enum SendError {
    /// Recipient address is empty or malformed.
    #[error("{0}")]
    InvalidRecipient(String),

    /// Amount is zero, unparsable, or out of range.
    #[error("{0}")]
    InvalidAmount(String),

    /// Payment id is not 64 hex characters.
    #[error("{0}")]
    InvalidPaymentId(String),

    /// Amount plus fee exceeds the wallet balance.
    #[error("{0}")]
    InsufficientBalance(String),

    /// Spending password is shorter than the configured minimum.
    #[error("Password must be at least {minimum} characters.")]
    PasswordTooShort { minimum: usize },

    /// The external send action reported a failure.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Operation not allowed in the current send phase or store state.
    #[error("{0}")]
    InvalidState(String),

    /// No wallet with the given id is known to the store.
    #[error("No wallet with id '{0}'.")]
    UnknownWallet(String),

    /// Settings, wallet file, or outbox persistence error.
    #[error("{0}")]
    Storage(String),

    /// Unexpected error from internal subsystems.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SendError {
    /// Local validation failures. These never reach the send action and
    /// leave the send phase untouched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SendError::InvalidRecipient(_)
                | SendError::InvalidAmount(_)
                | SendError::InvalidPaymentId(_)
                | SendError::InsufficientBalance(_)
                | SendError::PasswordTooShort { .. }
        )
    }
}

/// Failure reported by the external wallet-sending action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The backend could not accept the order (storage or daemon unavailable).
    #[error("Send backend unavailable: {0}")]
    Unavailable(String),

    /// Wrong spending password, invalid signature, or a daemon-side rejection.
    #[error("Transaction rejected: {0}")]
    Rejected(String),
}

/// Raised by `AddressMasker::try_mask` for input it refuses to shorten.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    #[error("address of {length} characters is too short to mask (minimum {minimum})")]
    InvalidInput { length: usize, minimum: usize },
}

/// Alias for `std::result::Result<T, SendError>`.
pub type Result<T> = std::result::Result<T, SendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_classification() {
        assert!(SendError::InvalidRecipient("x".into()).is_validation());
        assert!(SendError::PasswordTooShort { minimum: 8 }.is_validation());
        assert!(SendError::InsufficientBalance("x".into()).is_validation());
        assert!(!SendError::InvalidState("x".into()).is_validation());
        assert!(!SendError::Submission(SubmissionError::Network("down".into())).is_validation());
    }

    #[test]
    fn submission_error_wraps_transparently() {
        let err: SendError = SubmissionError::Rejected("bad signature".into()).into();
        assert_eq!(err.to_string(), "Transaction rejected: bad signature");
    }

    #[test]
    fn password_message_names_minimum() {
        let err = SendError::PasswordTooShort { minimum: 12 };
        assert!(err.to_string().contains("12"));
    }
}
