//! EVM wallet provider over alloy.
//!
//! Provides [`EvmWalletProvider`], which stands in for a browser-injected
//! wallet: it connects to a JSON-RPC endpoint and signs either with a local
//! key (derived from a mnemonic through [`kobe`], or given directly) or, when
//! no key is configured, through the node's unlocked accounts as Hardhat and
//! Anvil expose them.

use std::sync::atomic::{AtomicBool, Ordering};

use alloy::network::{Ethereum, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, TxHash};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::{error, info};

use super::{
    Network, PendingTransaction, RequestMethod, Signer, TransactionRecord, TransferRequest,
    WalletProvider,
};
use crate::contract::{AtmContract, EvmAtmContract};
use crate::error::WalletError;

/// Builder for constructing an [`EvmWalletProvider`].
///
/// Created by [`EvmWalletProvider::builder`].
///
/// ```rust,ignore
/// // Hardhat node, first unlocked account
/// let wallet = EvmWalletProvider::builder()
///     .rpc_url("http://127.0.0.1:8545")
///     .build()
///     .await?;
///
/// // HD wallet
/// let wallet = EvmWalletProvider::builder()
///     .rpc_url("http://127.0.0.1:8545")
///     .mnemonic("test test test ... junk")
///     .index(1)
///     .build()
///     .await?;
/// ```
#[derive(Debug, Default, Clone)]
pub struct EvmWalletProviderBuilder {
    /// JSON-RPC endpoint URL.
    rpc_url: Option<String>,
    /// BIP39 mnemonic phrase.
    mnemonic: Option<String>,
    /// BIP39 passphrase.
    passphrase: Option<String>,
    /// HD derivation index (default 0).
    index: u32,
    /// Raw private key hex string.
    private_key: Option<String>,
}

impl EvmWalletProviderBuilder {
    /// Set the JSON-RPC endpoint URL.
    #[must_use]
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    /// Set the BIP39 mnemonic phrase for HD key derivation.
    #[must_use]
    pub fn mnemonic(mut self, mnemonic: impl Into<String>) -> Self {
        self.mnemonic = Some(mnemonic.into());
        self
    }

    /// Set the BIP39 passphrase.
    #[must_use]
    pub fn passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Set the HD derivation index (default 0).
    #[must_use]
    pub const fn index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// Set the private key directly (hex string, with or without 0x prefix).
    #[must_use]
    pub fn private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    /// Build the [`EvmWalletProvider`].
    ///
    /// `rpc_url` is required. With neither `mnemonic` nor `private_key` set,
    /// the node's first unlocked account is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC URL is missing or unreachable, the key
    /// material is invalid, or the node exposes no unlocked account.
    pub async fn build(mut self) -> Result<EvmWalletProvider, WalletError> {
        let rpc_url = self
            .rpc_url
            .take()
            .ok_or_else(|| WalletError::Config("rpc_url is required".into()))?;

        let signer = if let Some(ref mnemonic) = self.mnemonic {
            Some(self.signer_from_mnemonic(mnemonic)?)
        } else if let Some(ref key) = self.private_key {
            Some(Self::signer_from_private_key(key)?)
        } else {
            None
        };

        let signs_locally = signer.is_some();
        let (provider, account) = if let Some(signer) = signer {
            let address = signer.address();
            let provider: DynProvider<Ethereum> = ProviderBuilder::new()
                .wallet(signer)
                .connect(&rpc_url)
                .await
                .map_err(|e| {
                    WalletError::provider(format!("failed to connect to '{rpc_url}': {e}"))
                })?
                .erased();
            (provider, address)
        } else {
            let provider: DynProvider<Ethereum> = ProviderBuilder::new()
                .connect(&rpc_url)
                .await
                .map_err(|e| {
                    WalletError::provider(format!("failed to connect to '{rpc_url}': {e}"))
                })?
                .erased();
            let accounts = provider
                .get_accounts()
                .await
                .map_err(|e| WalletError::provider(format!("failed to list accounts: {e}")))?;
            let account = accounts.first().copied().ok_or_else(|| {
                WalletError::Config(
                    "node exposes no unlocked accounts and no key was configured".into(),
                )
            })?;
            (provider, account)
        };

        info!(rpc_url = %rpc_url, account = %account, "wallet provider attached");

        Ok(EvmWalletProvider {
            provider,
            account,
            signs_locally,
            authorized: AtomicBool::new(false),
        })
    }

    /// Derive a signer from a BIP39 mnemonic using kobe.
    fn signer_from_mnemonic(&self, mnemonic: &str) -> Result<PrivateKeySigner, WalletError> {
        let wallet = kobe::Wallet::from_mnemonic(mnemonic, self.passphrase.as_deref())
            .map_err(|e| WalletError::Derivation(format!("invalid mnemonic: {e}")))?;

        let deriver = kobe_eth::Deriver::new(&wallet);
        let derived = deriver
            .derive(self.index)
            .map_err(|e| WalletError::Derivation(format!("key derivation failed: {e}")))?;

        let key_hex = &*derived.private_key_hex;
        key_hex
            .parse::<PrivateKeySigner>()
            .map_err(|e| WalletError::Derivation(format!("signer creation failed: {e}")))
    }

    /// Create a signer from a raw private key hex string.
    fn signer_from_private_key(key: &str) -> Result<PrivateKeySigner, WalletError> {
        let key = key.strip_prefix("0x").unwrap_or(key);
        key.parse::<PrivateKeySigner>()
            .map_err(|e| WalletError::Config(format!("invalid private key: {e}")))
    }
}

/// A wallet provider backed by a JSON-RPC node.
///
/// Accounts are reported only after [`RequestMethod::RequestAccounts`] has
/// been granted, mirroring an injected browser wallet.
pub struct EvmWalletProvider {
    /// Type-erased provider for RPC calls.
    provider: DynProvider<Ethereum>,
    /// The account transactions are sent from.
    account: Address,
    /// Whether `account` is backed by a local key rather than the node.
    signs_locally: bool,
    /// Whether account access has been granted.
    authorized: AtomicBool,
}

impl std::fmt::Debug for EvmWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmWalletProvider")
            .field("account", &self.account)
            .field("signs_locally", &self.signs_locally)
            .field("authorized", &self.authorized.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EvmWalletProvider {
    /// Create a builder for constructing an [`EvmWalletProvider`].
    #[must_use]
    pub fn builder() -> EvmWalletProviderBuilder {
        EvmWalletProviderBuilder::default()
    }

    /// Probe for a wallet: build one, or log why none is available.
    pub async fn detect(builder: EvmWalletProviderBuilder) -> Option<Self> {
        match builder.build().await {
            Ok(wallet) => Some(wallet),
            Err(e) => {
                error!(error = %e, "no wallet provider available");
                None
            }
        }
    }

    /// The account transactions are sent from.
    #[must_use]
    pub const fn account(&self) -> Address {
        self.account
    }
}

#[async_trait]
impl WalletProvider for EvmWalletProvider {
    async fn request(&self, method: RequestMethod) -> Result<Vec<Address>, WalletError> {
        match method {
            RequestMethod::RequestAccounts => {
                if self.signs_locally {
                    self.authorized.store(true, Ordering::SeqCst);
                    return Ok(vec![self.account]);
                }
                // A key-less provider relies on the node still unlocking the account.
                let accounts = self
                    .provider
                    .get_accounts()
                    .await
                    .map_err(|e| WalletError::provider(format!("{}: {e}", method.as_str())))?;
                if !accounts.contains(&self.account) {
                    return Err(WalletError::Rejected(format!(
                        "account {} is not available on this node",
                        self.account
                    )));
                }
                self.authorized.store(true, Ordering::SeqCst);
                Ok(vec![self.account])
            }
        }
    }

    async fn list_accounts(&self) -> Result<Vec<Address>, WalletError> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(vec![self.account])
        } else {
            Ok(Vec::new())
        }
    }

    async fn network(&self) -> Result<Network, WalletError> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::provider(format!("failed to get chain ID: {e}")))?;
        Ok(Network { chain_id })
    }

    fn signer(&self) -> Box<dyn Signer> {
        Box::new(EvmSigner {
            provider: self.provider.clone(),
            from: self.account,
        })
    }
}

/// Sends transactions from one account through the wallet's provider.
#[derive(Clone)]
pub struct EvmSigner {
    provider: DynProvider<Ethereum>,
    from: Address,
}

impl std::fmt::Debug for EvmSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmSigner")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Signer for EvmSigner {
    fn address(&self) -> Address {
        self.from
    }

    async fn send_transaction(
        &self,
        tx: TransferRequest,
    ) -> Result<Box<dyn PendingTransaction>, WalletError> {
        let request = TransactionRequest::default()
            .with_from(self.from)
            .with_to(tx.to)
            .with_value(tx.value);

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|e| WalletError::transaction(format!("send failed: {e}")))?;

        Ok(Box::new(EvmPendingTransaction::new(
            pending,
            self.provider.clone(),
        )))
    }

    fn bind_atm(&self, address: Address) -> Box<dyn AtmContract> {
        Box::new(EvmAtmContract::new(
            address,
            self.provider.clone(),
            self.from,
        ))
    }
}

/// A submitted transaction awaiting inclusion.
pub struct EvmPendingTransaction {
    inner: PendingTransactionBuilder<Ethereum>,
    provider: DynProvider<Ethereum>,
}

impl std::fmt::Debug for EvmPendingTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmPendingTransaction")
            .field("hash", self.inner.tx_hash())
            .finish_non_exhaustive()
    }
}

impl EvmPendingTransaction {
    /// Wrap an alloy pending transaction.
    #[must_use]
    pub const fn new(
        inner: PendingTransactionBuilder<Ethereum>,
        provider: DynProvider<Ethereum>,
    ) -> Self {
        Self { inner, provider }
    }
}

#[async_trait]
impl PendingTransaction for EvmPendingTransaction {
    fn hash(&self) -> TxHash {
        *self.inner.tx_hash()
    }

    async fn wait(self: Box<Self>) -> Result<TransactionRecord, WalletError> {
        let Self { inner, provider } = *self;
        let hash = *inner.tx_hash();

        let receipt = inner
            .get_receipt()
            .await
            .map_err(|e| WalletError::transaction(format!("receipt for {hash} failed: {e}")))?;

        if !receipt.status() {
            return Err(WalletError::transaction(format!("{hash} reverted")));
        }

        let block_number = receipt
            .block_number()
            .ok_or_else(|| WalletError::transaction(format!("{hash} has no block number")))?;
        let latest = provider
            .get_block_number()
            .await
            .map_err(|e| WalletError::provider(format!("failed to get block number: {e}")))?;

        Ok(TransactionRecord {
            transaction_hash: receipt.transaction_hash(),
            gas_used: receipt.gas_used(),
            block_number,
            confirmations: latest.saturating_sub(block_number) + 1,
        })
    }
}
