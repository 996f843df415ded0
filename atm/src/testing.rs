//! In-memory wallet and contract doubles for panel tests.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::contract::AtmContract;
use crate::error::{ContractError, WalletError};
use crate::wallet::{
    Network, PendingTransaction, RequestMethod, Signer, TransactionRecord, TransferRequest,
    WalletProvider,
};

/// Shared state behind every double handed out by one [`MockWallet`].
#[derive(Debug)]
pub(crate) struct MockChain {
    pub(crate) chain_id: AtomicU64,
    pub(crate) accounts: Vec<Address>,
    pub(crate) reject_request: AtomicBool,
    pub(crate) fail_transfer: AtomicBool,
    pub(crate) fail_balance: AtomicBool,
    pub(crate) fail_network: AtomicBool,
    pub(crate) balance: Mutex<U256>,
    pub(crate) balance_calls: AtomicUsize,
    pub(crate) bind_calls: AtomicUsize,
    pub(crate) deposits: AtomicUsize,
    pub(crate) withdrawals: AtomicUsize,
    pub(crate) transfers: Mutex<Vec<TransferRequest>>,
    block: AtomicU64,
}

impl MockChain {
    pub(crate) fn new(chain_id: u64) -> Arc<Self> {
        Arc::new(Self {
            chain_id: AtomicU64::new(chain_id),
            accounts: vec![Address::repeat_byte(0x11)],
            reject_request: AtomicBool::new(false),
            fail_transfer: AtomicBool::new(false),
            fail_balance: AtomicBool::new(false),
            fail_network: AtomicBool::new(false),
            balance: Mutex::new(U256::ZERO),
            balance_calls: AtomicUsize::new(0),
            bind_calls: AtomicUsize::new(0),
            deposits: AtomicUsize::new(0),
            withdrawals: AtomicUsize::new(0),
            transfers: Mutex::new(Vec::new()),
            block: AtomicU64::new(0),
        })
    }

    pub(crate) fn set_balance(&self, value: u64) {
        *self.balance.lock().unwrap() = U256::from(value);
    }

    pub(crate) fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    fn mine(self: &Arc<Self>, effect: Effect) -> Box<dyn PendingTransaction> {
        let block = self.block.fetch_add(1, Ordering::SeqCst) + 1;
        Box::new(MockPending {
            chain: Arc::clone(self),
            hash: TxHash::with_last_byte(u8::try_from(block % 256).unwrap()),
            block,
            effect,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Effect {
    Credit(U256),
    Debit(U256),
    Transfer,
}

#[derive(Debug)]
struct MockPending {
    chain: Arc<MockChain>,
    hash: TxHash,
    block: u64,
    effect: Effect,
}

#[async_trait]
impl PendingTransaction for MockPending {
    fn hash(&self) -> TxHash {
        self.hash
    }

    async fn wait(self: Box<Self>) -> Result<TransactionRecord, WalletError> {
        let mut balance = self.chain.balance.lock().unwrap();
        match self.effect {
            Effect::Credit(amount) => *balance += amount,
            Effect::Debit(amount) => {
                if amount > *balance {
                    return Err(WalletError::transaction(format!(
                        "{} reverted: InsufficientBalance",
                        self.hash
                    )));
                }
                *balance -= amount;
            }
            Effect::Transfer => {}
        }
        Ok(TransactionRecord {
            transaction_hash: self.hash,
            gas_used: 21_000,
            block_number: self.block,
            confirmations: 1,
        })
    }
}

/// A wallet provider over a [`MockChain`].
#[derive(Debug)]
pub(crate) struct MockWallet {
    pub(crate) chain: Arc<MockChain>,
    authorized: AtomicBool,
}

impl MockWallet {
    pub(crate) fn new(chain: &Arc<MockChain>) -> Self {
        Self {
            chain: Arc::clone(chain),
            authorized: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request(&self, method: RequestMethod) -> Result<Vec<Address>, WalletError> {
        if self.chain.reject_request.load(Ordering::SeqCst) {
            return Err(WalletError::Rejected(format!(
                "{}: user rejected the request",
                method.as_str()
            )));
        }
        self.authorized.store(true, Ordering::SeqCst);
        Ok(self.chain.accounts.clone())
    }

    async fn list_accounts(&self) -> Result<Vec<Address>, WalletError> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(self.chain.accounts.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn network(&self) -> Result<Network, WalletError> {
        if self.chain.fail_network.load(Ordering::SeqCst) {
            return Err(WalletError::provider("eth_chainId: connection refused"));
        }
        Ok(Network {
            chain_id: self.chain.chain_id.load(Ordering::SeqCst),
        })
    }

    fn signer(&self) -> Box<dyn Signer> {
        Box::new(MockSigner {
            chain: Arc::clone(&self.chain),
        })
    }
}

#[derive(Debug)]
struct MockSigner {
    chain: Arc<MockChain>,
}

#[async_trait]
impl Signer for MockSigner {
    fn address(&self) -> Address {
        self.chain.accounts[0]
    }

    async fn send_transaction(
        &self,
        tx: TransferRequest,
    ) -> Result<Box<dyn PendingTransaction>, WalletError> {
        if self.chain.fail_transfer.load(Ordering::SeqCst) {
            return Err(WalletError::transaction("insufficient funds for gas"));
        }
        self.chain.transfers.lock().unwrap().push(tx);
        Ok(self.chain.mine(Effect::Transfer))
    }

    fn bind_atm(&self, _address: Address) -> Box<dyn AtmContract> {
        self.chain.bind_calls.fetch_add(1, Ordering::SeqCst);
        Box::new(MockContract {
            chain: Arc::clone(&self.chain),
        })
    }
}

#[derive(Debug)]
struct MockContract {
    chain: Arc<MockChain>,
}

#[async_trait]
impl AtmContract for MockContract {
    async fn get_balance(&self) -> Result<U256, ContractError> {
        self.chain.balance_calls.fetch_add(1, Ordering::SeqCst);
        if self.chain.fail_balance.load(Ordering::SeqCst) {
            return Err(ContractError::call("getBalance", "execution reverted"));
        }
        Ok(*self.chain.balance.lock().unwrap())
    }

    async fn deposit(&self, amount: U256) -> Result<Box<dyn PendingTransaction>, ContractError> {
        self.chain.deposits.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain.mine(Effect::Credit(amount)))
    }

    async fn withdraw(&self, amount: U256) -> Result<Box<dyn PendingTransaction>, ContractError> {
        self.chain.withdrawals.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain.mine(Effect::Debit(amount)))
    }
}
