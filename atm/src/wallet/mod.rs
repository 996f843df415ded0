//! Wallet capabilities consumed by the ATM panel.
//!
//! The panel never talks to an RPC node directly. It goes through three
//! narrow capability traits, so any wallet backend can sit behind them:
//!
//! ```text
//! WalletProvider
//!   ├── request()        → authorize accounts (eth_requestAccounts)
//!   ├── list_accounts()  → authorized addresses
//!   ├── network()        → active chain ID
//!   └── signer()         → Signer
//!                            ├── send_transaction() → PendingTransaction
//!                            └── bind_atm()         → AtmContract
//! PendingTransaction
//!   └── wait()           → TransactionRecord
//! ```
//!
//! [`EvmWalletProvider`] implements them over [`alloy`].

mod amount;
mod evm;

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::contract::AtmContract;
use crate::error::WalletError;

pub use amount::{TransferAmount, parse_int_prefix};
pub use evm::{EvmPendingTransaction, EvmSigner, EvmWalletProvider, EvmWalletProviderBuilder};

/// A request the wallet can be asked to authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RequestMethod {
    /// Ask the user to authorize account access.
    RequestAccounts,
}

impl RequestMethod {
    /// The JSON-RPC method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestAccounts => "eth_requestAccounts",
        }
    }
}

/// The network a wallet is currently connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// EIP-155 chain identifier.
    pub chain_id: u64,
}

/// A native-currency transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    /// Recipient address.
    pub to: Address,
    /// Amount in wei.
    pub value: U256,
}

/// Receipt of a transaction included in a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction hash.
    pub transaction_hash: TxHash,
    /// Gas consumed by the transaction.
    pub gas_used: u64,
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Number of blocks mined on top of the inclusion block, plus one.
    pub confirmations: u64,
}

/// A wallet provider: account authorization, network identity and signing.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet to authorize a request, returning the authorized accounts.
    async fn request(&self, method: RequestMethod) -> Result<Vec<Address>, WalletError>;

    /// Accounts the wallet has already authorized.
    async fn list_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// The network the wallet is connected to.
    async fn network(&self) -> Result<Network, WalletError>;

    /// A signer for the wallet's active account.
    fn signer(&self) -> Box<dyn Signer>;
}

/// Signs and submits transactions on behalf of one account.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The signing account.
    fn address(&self) -> Address;

    /// Submit a native-currency transfer.
    async fn send_transaction(
        &self,
        tx: TransferRequest,
    ) -> Result<Box<dyn PendingTransaction>, WalletError>;

    /// Bind the ATM contract deployed at `address` to this signer.
    fn bind_atm(&self, address: Address) -> Box<dyn AtmContract>;
}

/// A submitted transaction that has not been confirmed yet.
#[async_trait]
pub trait PendingTransaction: Send {
    /// Hash of the submitted transaction.
    fn hash(&self) -> TxHash;

    /// Wait for the transaction to be included in a block.
    async fn wait(self: Box<Self>) -> Result<TransactionRecord, WalletError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_method_name() {
        assert_eq!(RequestMethod::RequestAccounts.as_str(), "eth_requestAccounts");
    }

    #[test]
    fn test_record_serializes_hash_as_hex() {
        let record = TransactionRecord {
            transaction_hash: TxHash::repeat_byte(0xab),
            gas_used: 21_000,
            block_number: 7,
            confirmations: 1,
        };
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["gas_used"], 21_000);
        assert!(
            json["transaction_hash"]
                .as_str()
                .unwrap()
                .starts_with("0xabab")
        );
    }
}
