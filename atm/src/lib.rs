#![cfg_attr(docsrs, feature(doc_cfg))]
//! Client for a demo bank ATM smart contract.
//!
//! The crate connects to a wallet, binds the ATM contract when the wallet
//! is on a local development network, and exposes deposit, withdraw and
//! transfer actions together with the balance and transaction history they
//! produce.
//!
//! - [`wallet`]: the wallet capabilities the client consumes, and an
//!   [`alloy`]-backed implementation.
//! - [`contract`]: the bundled contract ABI and its binding.
//! - [`panel`]: [`AccountPanel`], which owns all client state.
//!
//! ```rust,ignore
//! use atm::{AccountPanel, AtmConfig, EvmWalletProvider};
//!
//! let wallet = EvmWalletProvider::detect(
//!     EvmWalletProvider::builder().rpc_url("http://127.0.0.1:8545"),
//! )
//! .await;
//! let mut panel = AccountPanel::mount(AtmConfig::default(), wallet);
//! panel.connect().await;
//! print!("{}", panel.view());
//! ```

pub mod config;
pub mod contract;
pub mod error;
pub mod panel;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use alloy::primitives::{Address, U256};
pub use config::AtmConfig;
pub use error::{ContractError, Error, Result, WalletError};
pub use panel::{AccountPanel, PanelState, PanelView};
pub use wallet::{EvmWalletProvider, TransactionRecord, WalletProvider};
