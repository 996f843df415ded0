//! The account panel: all client state and the user-triggered handlers.
//!
//! # State machine
//!
//! ```text
//! NoWallet                                   (terminal, install prompt)
//! Disconnected ──connect──▶ Connected{unbound} ──network accepted──▶ Connected{bound}
//!                                                                      │   ▲
//!                                                                      └───┘ deposit / withdraw /
//!                                                                            transfer / toggles
//! ```
//!
//! Every handler is a sequential `async fn(&mut self)`: calls into the
//! wallet or contract are awaited one after another and nothing is spawned.
//! Handlers never return errors. Failures are logged with `tracing` and the
//! state is left as it was, except for [`AccountPanel::transfer`], which also
//! reports its outcome through [`AccountPanel::notification`].
//!
//! A front-end observes the panel through [`AccountPanel::view`] or by
//! [subscribing](AccountPanel::subscribe) to the views published after every
//! state change.

mod view;

use alloy::primitives::{Address, U256};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::AtmConfig;
use crate::contract::AtmContract;
use crate::error::{Error, WalletError};
use crate::wallet::{
    PendingTransaction, RequestMethod, TransactionRecord, TransferAmount, TransferRequest,
    WalletProvider, parse_int_prefix,
};

pub use view::{
    AccountView, BalanceLine, CONNECT_PROMPT, INSTALL_PROMPT, PanelBody, PanelView,
};

/// Notification shown after any failed transfer.
pub const TRANSFER_FAILED: &str = "Error transferring. Please try again.";

/// Coarse connection state of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// No wallet provider was found on mount.
    NoWallet,
    /// A wallet is present but no account is connected.
    Disconnected,
    /// An account is connected; `bound` tells whether the contract is usable.
    Connected {
        /// Whether the contract binding exists.
        bound: bool,
    },
}

/// Current values of the panel's form inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    /// Withdraw amount field, parsed on submit.
    pub withdraw_amount: String,
    /// Deposit amount field, parsed on submit.
    pub deposit_amount: String,
    /// Transfer slider value.
    pub transfer_amount: TransferAmount,
    /// Transfer recipient field, parsed on submit.
    pub recipient: String,
}

#[derive(Debug, Clone, Copy)]
enum ContractAction {
    Deposit,
    Withdraw,
}

impl ContractAction {
    const fn name(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
        }
    }
}

/// The ATM account panel.
///
/// Generic over the wallet backend; use
/// [`EvmWalletProvider`](crate::wallet::EvmWalletProvider) for a real node.
///
/// ```rust,ignore
/// let wallet = EvmWalletProvider::detect(
///     EvmWalletProvider::builder().rpc_url("http://127.0.0.1:8545"),
/// )
/// .await;
/// let mut panel = AccountPanel::mount(AtmConfig::default(), wallet);
///
/// panel.connect().await;
/// panel.set_deposit_amount("250");
/// panel.deposit().await;
/// println!("{}", panel.view());
/// ```
pub struct AccountPanel<W: WalletProvider> {
    config: AtmConfig,
    wallet: Option<W>,
    account: Option<Address>,
    contract: Option<Box<dyn AtmContract>>,
    balance: Option<U256>,
    history: Vec<TransactionRecord>,
    show_balance: bool,
    show_history: bool,
    selected: Option<TransactionRecord>,
    forms: FormState,
    notification: Option<String>,
    views: watch::Sender<PanelView>,
}

impl<W: WalletProvider> std::fmt::Debug for AccountPanel<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountPanel")
            .field("state", &self.state())
            .field("account", &self.account)
            .field("balance", &self.balance)
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl<W: WalletProvider> AccountPanel<W> {
    /// Mount the panel over whatever wallet the host environment provides.
    #[must_use]
    pub fn mount(config: AtmConfig, wallet: Option<W>) -> Self {
        if wallet.is_none() {
            warn!("no wallet provider found");
        }

        let transfer_amount = TransferAmount::parse(&config.forms.transfer_amount)
            .unwrap_or_else(|e| {
                warn!(error = %e, "configured transfer amount rejected, using the minimum");
                TransferAmount::default()
            });
        let forms = FormState {
            withdraw_amount: config.forms.withdraw_amount.clone(),
            deposit_amount: config.forms.deposit_amount.clone(),
            transfer_amount,
            recipient: config.forms.recipient.clone(),
        };
        let show_balance = config.show_balance;

        let placeholder = PanelView {
            title: config.title.clone(),
            body: PanelBody::InstallPrompt,
            details: None,
        };
        let (views, _) = watch::channel(placeholder);

        let panel = Self {
            config,
            wallet,
            account: None,
            contract: None,
            balance: None,
            history: Vec::new(),
            show_balance,
            show_history: false,
            selected: None,
            forms,
            notification: None,
            views,
        };
        panel.publish();
        panel
    }

    // ------------------------------------------------------------------
    // Connection
    // ------------------------------------------------------------------

    /// Ask the wallet for account access, then adopt the first account and
    /// bind the contract if the network is accepted.
    ///
    /// A rejected request is logged and leaves the panel disconnected.
    pub async fn connect(&mut self) {
        let Some(wallet) = self.wallet.as_ref() else {
            warn!("connect requested without a wallet provider");
            return;
        };

        if let Err(e) = wallet.request(RequestMethod::RequestAccounts).await {
            error!(error = %e, "error connecting account");
            return;
        }

        let accounts = match wallet.list_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                error!(error = %e, "error listing accounts");
                return;
            }
        };
        let Some(&account) = accounts.first() else {
            info!("no account found");
            return;
        };

        info!(account = %account, "account connected");
        self.account = Some(account);
        self.publish();

        self.bind_contract().await;
        self.fetch_missing_balance().await;
    }

    /// Construct the contract binding if the wallet's network is accepted,
    /// or drop it otherwise.
    async fn bind_contract(&mut self) {
        let Some(wallet) = self.wallet.as_ref() else {
            return;
        };

        let network = match wallet.network().await {
            Ok(network) => network,
            Err(e) => {
                error!(error = %e, "error reading network");
                self.contract = None;
                self.publish();
                return;
            }
        };
        debug!(chain_id = network.chain_id, "network");

        if self.config.accepts_chain(network.chain_id) {
            let contract = wallet.signer().bind_atm(self.config.contract_address);
            info!(
                chain_id = network.chain_id,
                contract = %self.config.contract_address,
                "contract bound",
            );
            self.contract = Some(contract);
        } else {
            error!(
                chain_id = network.chain_id,
                accepted = ?self.config.accepted_chain_ids,
                "unsupported network",
            );
            self.contract = None;
        }
        self.publish();
    }

    // ------------------------------------------------------------------
    // Contract actions
    // ------------------------------------------------------------------

    /// Fetch the balance from the contract. A no-op without a binding.
    pub async fn get_balance(&mut self) {
        let Some(contract) = self.contract.as_ref() else {
            return;
        };

        match contract.get_balance().await {
            Ok(balance) => {
                info!(%balance, "balance fetched");
                self.balance = Some(balance);
                self.publish();
            }
            Err(e) => error!(error = %e, "error fetching balance"),
        }
    }

    /// Deposit the amount in the deposit field.
    pub async fn deposit(&mut self) {
        self.submit(ContractAction::Deposit).await;
    }

    /// Withdraw the amount in the withdraw field.
    pub async fn withdraw(&mut self) {
        self.submit(ContractAction::Withdraw).await;
    }

    async fn submit(&mut self, action: ContractAction) {
        let Some(contract) = self.contract.as_ref() else {
            return;
        };
        let field = match action {
            ContractAction::Deposit => &self.forms.deposit_amount,
            ContractAction::Withdraw => &self.forms.withdraw_amount,
        };
        if field.is_empty() {
            return;
        }

        let amount = match parse_int_prefix(field) {
            Ok(amount) => amount,
            Err(e) => {
                error!(action = action.name(), error = %e, "transaction error");
                return;
            }
        };

        let submitted = match action {
            ContractAction::Deposit => contract.deposit(amount).await,
            ContractAction::Withdraw => contract.withdraw(amount).await,
        };
        match submitted {
            Ok(pending) => self.confirm_transaction(pending).await,
            Err(e) => error!(action = action.name(), error = %e, "transaction error"),
        }
    }

    /// Wait for a contract transaction, then refresh the balance and append
    /// the receipt to the history. Failures are only logged.
    pub async fn confirm_transaction(&mut self, pending: Box<dyn PendingTransaction>) {
        let hash = pending.hash();
        match pending.wait().await {
            Ok(record) => {
                log_receipt(&record);
                self.get_balance().await;
                self.history.push(record);
                self.publish();
            }
            Err(e) => {
                error!(tx = %hash, error = %e, "transaction error");
                self.fetch_missing_balance().await;
            }
        }
    }

    /// Fetch the balance if it is visible but was never loaded, the way a
    /// re-render of the connected view would.
    async fn fetch_missing_balance(&mut self) {
        if self.show_balance && self.balance.is_none() {
            self.get_balance().await;
        }
    }

    // ------------------------------------------------------------------
    // Transfer
    // ------------------------------------------------------------------

    /// Send the slider amount of native currency to the recipient field,
    /// through the wallet's signer rather than the contract.
    ///
    /// Sets [`notification`](Self::notification) on both success and failure.
    pub async fn transfer(&mut self) {
        let Some(wallet) = self.wallet.as_ref() else {
            return;
        };
        if self.account.is_none() {
            warn!("transfer requested without a connected account");
            return;
        }
        let amount = self.forms.transfer_amount.clone();
        let recipient = self.forms.recipient.clone();

        match send_transfer(wallet, &amount, recipient.trim()).await {
            Ok(record) => {
                log_receipt(&record);
                self.get_balance().await;
                self.notification = Some(format!(
                    "Transfer of {amount} ETH to {recipient} successful."
                ));
            }
            Err(e) => {
                error!(to = %recipient, %amount, error = %e, "error transferring ETH");
                self.notification = Some(TRANSFER_FAILED.to_string());
                self.fetch_missing_balance().await;
            }
        }
        self.publish();
    }

    // ------------------------------------------------------------------
    // Local toggles and selection
    // ------------------------------------------------------------------

    /// Show or hide the balance. Showing it with nothing cached fetches once.
    pub async fn toggle_balance(&mut self) {
        self.show_balance = !self.show_balance;
        debug!(show = self.show_balance, "balance visibility");
        self.publish();
        self.fetch_missing_balance().await;
    }

    /// Show or hide the transaction history.
    pub fn toggle_history(&mut self) {
        self.show_history = !self.show_history;
        debug!(show = self.show_history, "history visibility");
        self.publish();
    }

    /// Select a history entry for the detail view.
    ///
    /// Returns `false`, leaving the selection unchanged, if `index` is out of range.
    pub fn select_transaction(&mut self, index: usize) -> bool {
        let Some(record) = self.history.get(index) else {
            return false;
        };
        debug!(index, tx = %record.transaction_hash, "transaction selected");
        self.selected = Some(*record);
        self.publish();
        true
    }

    /// Close the detail view.
    pub fn close_details(&mut self) {
        self.selected = None;
        self.publish();
    }

    // ------------------------------------------------------------------
    // Form inputs
    // ------------------------------------------------------------------

    /// Set the withdraw amount field.
    pub fn set_withdraw_amount(&mut self, value: impl Into<String>) {
        self.forms.withdraw_amount = value.into();
        self.publish();
    }

    /// Set the deposit amount field.
    pub fn set_deposit_amount(&mut self, value: impl Into<String>) {
        self.forms.deposit_amount = value.into();
        self.publish();
    }

    /// Move the transfer slider.
    ///
    /// # Errors
    ///
    /// Returns an error, keeping the previous value, if `value` is outside
    /// [0.01, 10] or off the 0.01 step.
    pub fn set_transfer_amount(&mut self, value: &str) -> Result<(), Error> {
        self.forms.transfer_amount = TransferAmount::parse(value)?;
        self.publish();
        Ok(())
    }

    /// Set the recipient field.
    pub fn set_recipient(&mut self, value: impl Into<String>) {
        self.forms.recipient = value.into();
        self.publish();
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Coarse connection state.
    #[must_use]
    pub const fn state(&self) -> PanelState {
        if self.wallet.is_none() {
            PanelState::NoWallet
        } else if self.account.is_none() {
            PanelState::Disconnected
        } else {
            PanelState::Connected {
                bound: self.contract.is_some(),
            }
        }
    }

    /// Whether a wallet provider was found on mount.
    #[must_use]
    pub const fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    /// Whether the contract binding exists.
    #[must_use]
    pub const fn has_contract(&self) -> bool {
        self.contract.is_some()
    }

    /// The connected account.
    #[must_use]
    pub const fn account(&self) -> Option<Address> {
        self.account
    }

    /// The last fetched balance.
    #[must_use]
    pub const fn balance(&self) -> Option<U256> {
        self.balance
    }

    /// Confirmed contract transactions, oldest first.
    #[must_use]
    pub fn history(&self) -> &[TransactionRecord] {
        &self.history
    }

    /// The transaction shown in the detail view.
    #[must_use]
    pub const fn selected(&self) -> Option<&TransactionRecord> {
        self.selected.as_ref()
    }

    /// Outcome of the last transfer.
    #[must_use]
    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    /// Whether the balance line is visible.
    #[must_use]
    pub const fn show_balance(&self) -> bool {
        self.show_balance
    }

    /// Whether the history list is visible.
    #[must_use]
    pub const fn show_history(&self) -> bool {
        self.show_history
    }

    /// Current form values.
    #[must_use]
    pub const fn forms(&self) -> &FormState {
        &self.forms
    }

    /// The panel's configuration.
    #[must_use]
    pub const fn config(&self) -> &AtmConfig {
        &self.config
    }

    /// Subscribe to the views published after every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PanelView> {
        self.views.subscribe()
    }

    /// Snapshot of what the panel renders.
    #[must_use]
    pub fn view(&self) -> PanelView {
        let body = if self.wallet.is_none() {
            PanelBody::InstallPrompt
        } else if let Some(account) = self.account {
            PanelBody::Account(AccountView {
                account,
                balance: self.show_balance.then_some(BalanceLine {
                    value: self.balance,
                }),
                withdraw_amount: self.forms.withdraw_amount.clone(),
                deposit_amount: self.forms.deposit_amount.clone(),
                history: self.show_history.then(|| self.history.clone()),
                transfer_amount: self.forms.transfer_amount.clone(),
                recipient: self.forms.recipient.clone(),
                notification: self.notification.clone(),
            })
        } else {
            PanelBody::ConnectPrompt
        };

        PanelView {
            title: self.config.title.clone(),
            body,
            details: self.selected,
        }
    }

    fn publish(&self) {
        self.views.send_replace(self.view());
    }
}

async fn send_transfer<W: WalletProvider>(
    wallet: &W,
    amount: &TransferAmount,
    recipient: &str,
) -> Result<TransactionRecord, WalletError> {
    let to: Address = recipient
        .parse()
        .map_err(|_| WalletError::InvalidAddress(recipient.to_string()))?;

    let pending = wallet
        .signer()
        .send_transaction(TransferRequest {
            to,
            value: amount.wei(),
        })
        .await?;
    pending.wait().await
}

fn log_receipt(record: &TransactionRecord) {
    info!(
        tx = %record.transaction_hash,
        gas_used = record.gas_used,
        block = record.block_number,
        confirmations = record.confirmations,
        "transaction confirmed",
    );
}
