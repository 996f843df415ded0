//! Unified error types for the ATM client.
//!
//! Handlers on [`AccountPanel`](crate::panel::AccountPanel) never surface
//! these to callers; they are logged where they occur. The types exist so
//! that the wallet and contract adapters can report precise failure modes.

/// Result type alias for ATM operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the ATM client.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Wallet provider or signer error.
    #[error("wallet: {0}")]
    Wallet(#[from] WalletError),

    /// Contract binding error.
    #[error("contract: {0}")]
    Contract(#[from] ContractError),

    /// Invalid configuration.
    #[error("config: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Error type for wallet provider, signer and pending transaction operations.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum WalletError {
    /// The wallet could not be configured.
    #[error("configuration error: {0}")]
    Config(String),

    /// HD key derivation failed.
    #[error("derivation error: {0}")]
    Derivation(String),

    /// The RPC provider returned an error.
    #[error("provider error: {0}")]
    Provider(String),

    /// The user (or node) refused account authorization.
    #[error("authorization rejected: {0}")]
    Rejected(String),

    /// Transaction submission or inclusion failed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// An address string could not be parsed.
    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    /// An amount string could not be parsed or is out of range.
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
}

impl WalletError {
    /// Create a provider error.
    #[must_use]
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a transaction error.
    #[must_use]
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }
}

/// Error type for calls into the ATM contract.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ContractError {
    /// A read-only call failed or returned undecodable data.
    #[error("call to '{method}' failed: {message}")]
    Call {
        /// Contract method name.
        method: &'static str,
        /// Human-readable error description.
        message: String,
    },

    /// A state-changing call could not be submitted.
    #[error("send of '{method}' failed: {message}")]
    Send {
        /// Contract method name.
        method: &'static str,
        /// Human-readable error description.
        message: String,
    },
}

impl ContractError {
    /// Creates a [`Call`](Self::Call) error for the given method.
    #[must_use]
    pub fn call(method: &'static str, message: impl Into<String>) -> Self {
        Self::Call {
            method,
            message: message.into(),
        }
    }

    /// Creates a [`Send`](Self::Send) error for the given method.
    #[must_use]
    pub fn send(method: &'static str, message: impl Into<String>) -> Self {
        Self::Send {
            method,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err: Error = WalletError::Rejected("user denied".into()).into();
        assert_eq!(err.to_string(), "wallet: authorization rejected: user denied");

        let err: Error = ContractError::call("getBalance", "reverted").into();
        assert_eq!(
            err.to_string(),
            "contract: call to 'getBalance' failed: reverted"
        );
    }
}
