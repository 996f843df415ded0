//! [`AtmContract`] over an alloy contract instance.

use alloy::network::Ethereum;
use alloy::primitives::{Address, U256};
use alloy::providers::DynProvider;
use async_trait::async_trait;
use tracing::debug;

use super::{AtmContract, Assessment};
use crate::error::ContractError;
use crate::wallet::{EvmPendingTransaction, PendingTransaction};

/// The ATM contract bound to an account on an alloy provider.
///
/// Calls are sent `from` the bound account, so the same binding works for
/// locally signed wallets and for node-unlocked accounts.
pub struct EvmAtmContract {
    instance: Assessment::AssessmentInstance<DynProvider<Ethereum>>,
    provider: DynProvider<Ethereum>,
    from: Address,
}

impl std::fmt::Debug for EvmAtmContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmAtmContract")
            .field("address", self.instance.address())
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl EvmAtmContract {
    /// Bind the contract at `address`, sending from `from`.
    #[must_use]
    pub fn new(address: Address, provider: DynProvider<Ethereum>, from: Address) -> Self {
        Self {
            instance: Assessment::new(address, provider.clone()),
            provider,
            from,
        }
    }

    /// Address of the bound contract.
    #[must_use]
    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

#[async_trait]
impl AtmContract for EvmAtmContract {
    async fn get_balance(&self) -> Result<U256, ContractError> {
        self.instance
            .getBalance()
            .from(self.from)
            .call()
            .await
            .map_err(|e| ContractError::call("getBalance", e.to_string()))
    }

    async fn deposit(&self, amount: U256) -> Result<Box<dyn PendingTransaction>, ContractError> {
        let pending = self
            .instance
            .deposit(amount)
            .from(self.from)
            .send()
            .await
            .map_err(|e| ContractError::send("deposit", e.to_string()))?;
        debug!(tx = %pending.tx_hash(), %amount, "deposit submitted");
        Ok(Box::new(EvmPendingTransaction::new(
            pending,
            self.provider.clone(),
        )))
    }

    async fn withdraw(&self, amount: U256) -> Result<Box<dyn PendingTransaction>, ContractError> {
        let pending = self
            .instance
            .withdraw(amount)
            .from(self.from)
            .send()
            .await
            .map_err(|e| ContractError::send("withdraw", e.to_string()))?;
        debug!(tx = %pending.tx_hash(), %amount, "withdraw submitted");
        Ok(Box::new(EvmPendingTransaction::new(
            pending,
            self.provider.clone(),
        )))
    }
}
