//! Client configuration.
//!
//! [`AtmConfig`] carries the deployment constants (contract address, the
//! chain IDs treated as local development networks) and the initial values
//! of the panel's form fields. Every field has a default, so a JSON config
//! file only needs to name what it overrides.

use std::path::Path;

use alloy::primitives::{Address, address};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// First contract address deployed by a fresh Hardhat or Anvil node.
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

/// Chain IDs of the local development networks (Ganache/legacy Hardhat, Hardhat/Anvil).
pub const LOCAL_CHAIN_IDS: [u64; 2] = [1337, 31337];

/// Initial values of the panel's form inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    /// Withdraw amount field.
    pub withdraw_amount: String,
    /// Deposit amount field.
    pub deposit_amount: String,
    /// Transfer slider value, in ETH.
    pub transfer_amount: String,
    /// Transfer recipient field.
    pub recipient: String,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            withdraw_amount: "500".to_string(),
            deposit_amount: "1000".to_string(),
            transfer_amount: "0.01".to_string(),
            recipient: String::new(),
        }
    }
}

/// Configuration for an [`AccountPanel`](crate::panel::AccountPanel).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmConfig {
    /// Address of the deployed ATM contract.
    pub contract_address: Address,
    /// Chain IDs on which the contract binding is constructed.
    pub accepted_chain_ids: Vec<u64>,
    /// Heading shown above the panel.
    pub title: String,
    /// Initial form values.
    pub forms: FormDefaults,
    /// Whether the balance line starts visible.
    pub show_balance: bool,
}

impl Default for AtmConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            accepted_chain_ids: LOCAL_CHAIN_IDS.to_vec(),
            title: "WELCOME TO YOUR BANK ACCOUNT".to_string(),
            forms: FormDefaults::default(),
            show_balance: true,
        }
    }
}

impl AtmConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a JSON file. Absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// names no accepted chain IDs.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the contract address.
    #[must_use]
    pub const fn contract_address(mut self, address: Address) -> Self {
        self.contract_address = address;
        self
    }

    /// Set the accepted chain IDs.
    #[must_use]
    pub fn accepted_chain_ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.accepted_chain_ids = ids.into_iter().collect();
        self
    }

    /// Set the heading.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Whether a chain ID is one of the accepted development networks.
    #[must_use]
    pub fn accepts_chain(&self, chain_id: u64) -> bool {
        self.accepted_chain_ids.contains(&chain_id)
    }

    /// Check the config for values that would leave the panel unusable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no chain IDs are accepted.
    pub fn validate(&self) -> Result<()> {
        if self.accepted_chain_ids.is_empty() {
            return Err(Error::config("accepted_chain_ids must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AtmConfig::default();
        assert_eq!(config.contract_address, DEFAULT_CONTRACT_ADDRESS);
        assert!(config.accepts_chain(1337));
        assert!(config.accepts_chain(31337));
        assert!(!config.accepts_chain(1));
        assert!(config.show_balance);
        assert_eq!(config.forms.withdraw_amount, "500");
        assert_eq!(config.forms.deposit_amount, "1000");
        assert_eq!(config.forms.transfer_amount, "0.01");
    }

    #[test]
    fn test_partial_json() {
        let config: AtmConfig =
            serde_json::from_str(r#"{"accepted_chain_ids": [5], "forms": {"deposit_amount": "7"}}"#)
                .unwrap();
        assert!(config.accepts_chain(5));
        assert!(!config.accepts_chain(31337));
        assert_eq!(config.forms.deposit_amount, "7");
        assert_eq!(config.forms.withdraw_amount, "500");
        assert_eq!(config.contract_address, DEFAULT_CONTRACT_ADDRESS);
    }

    #[test]
    fn test_validate_rejects_empty_chain_list() {
        let config = AtmConfig::new().accepted_chain_ids([]);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
