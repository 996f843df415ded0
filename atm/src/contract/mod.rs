//! The ATM contract binding.
//!
//! The contract ABI is bundled at build time through [`alloy::sol!`]; the
//! panel only sees the [`AtmContract`] capability trait, which a signer
//! produces via [`Signer::bind_atm`](crate::wallet::Signer::bind_atm).

mod evm;

use alloy::primitives::U256;
use async_trait::async_trait;

use crate::error::ContractError;
use crate::wallet::PendingTransaction;

pub use evm::EvmAtmContract;

#[allow(missing_docs, clippy::pub_underscore_fields)]
mod abi {
    alloy::sol! {
        #[sol(rpc)]
        contract Assessment {
            event Deposit(uint256 amount);
            event Withdraw(uint256 amount);

            error InsufficientBalance(uint256 balance, uint256 withdrawAmount);

            function getBalance() public view returns (uint256);
            function deposit(uint256 _amount) public payable;
            function withdraw(uint256 _withdrawAmount) public;
        }
    }
}

pub use abi::Assessment;

/// A signer-bound handle to a deployed ATM contract.
#[async_trait]
pub trait AtmContract: Send + Sync {
    /// The balance held by the contract.
    async fn get_balance(&self) -> Result<U256, ContractError>;

    /// Submit a deposit of `amount`.
    async fn deposit(&self, amount: U256) -> Result<Box<dyn PendingTransaction>, ContractError>;

    /// Submit a withdrawal of `amount`.
    async fn withdraw(&self, amount: U256) -> Result<Box<dyn PendingTransaction>, ContractError>;
}
