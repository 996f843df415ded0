//! Render model of the account panel.
//!
//! [`PanelView`] is a plain snapshot of what the panel shows; a front-end
//! draws it however it likes. The [`Display`](fmt::Display) impl is the
//! plain-text rendering used by the terminal front-end.

use std::fmt;

use alloy::primitives::{Address, U256};

use crate::wallet::{TransactionRecord, TransferAmount};

/// Shown when no wallet provider is available.
pub const INSTALL_PROMPT: &str = "Please install a wallet provider in order to use this ATM.";

/// Shown when a wallet is available but no account is connected.
pub const CONNECT_PROMPT: &str = "Please connect your wallet";

/// A snapshot of everything the panel renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    /// Heading.
    pub title: String,
    /// Main content, gated by wallet and account presence.
    pub body: PanelBody,
    /// The transaction selected from history, if any.
    pub details: Option<TransactionRecord>,
}

/// The gated main content of the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelBody {
    /// No wallet provider: nothing else is reachable.
    InstallPrompt,
    /// Wallet present, no account: only "connect" is actionable.
    ConnectPrompt,
    /// Connected account with its controls.
    Account(AccountView),
}

/// The connected-account controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountView {
    /// Connected address.
    pub account: Address,
    /// Balance line; `None` while hidden.
    pub balance: Option<BalanceLine>,
    /// Withdraw amount field.
    pub withdraw_amount: String,
    /// Deposit amount field.
    pub deposit_amount: String,
    /// Transaction history; `None` while hidden.
    pub history: Option<Vec<TransactionRecord>>,
    /// Transfer slider value.
    pub transfer_amount: TransferAmount,
    /// Transfer recipient field.
    pub recipient: String,
    /// Outcome of the last transfer.
    pub notification: Option<String>,
}

/// A visible balance line. `value` is `None` until the first fetch lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceLine {
    /// Last fetched balance.
    pub value: Option<U256>,
}

impl AccountView {
    /// Label of the balance visibility button.
    #[must_use]
    pub const fn balance_button(&self) -> &'static str {
        if self.balance.is_some() {
            "Hide Balance"
        } else {
            "Show Balance"
        }
    }

    /// Label of the history visibility button.
    #[must_use]
    pub const fn history_button(&self) -> &'static str {
        if self.history.is_some() {
            "Hide Transaction History"
        } else {
            "Show Transaction History"
        }
    }
}

impl PanelView {
    /// Whether the install prompt is shown.
    #[must_use]
    pub const fn is_install_prompt(&self) -> bool {
        matches!(self.body, PanelBody::InstallPrompt)
    }

    /// Whether the connect prompt is shown.
    #[must_use]
    pub const fn is_connect_prompt(&self) -> bool {
        matches!(self.body, PanelBody::ConnectPrompt)
    }

    /// The account controls, if an account is connected.
    #[must_use]
    pub const fn account(&self) -> Option<&AccountView> {
        match &self.body {
            PanelBody::Account(view) => Some(view),
            _ => None,
        }
    }
}

impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f)?;
        match &self.body {
            PanelBody::InstallPrompt => writeln!(f, "{INSTALL_PROMPT}")?,
            PanelBody::ConnectPrompt => writeln!(f, "[{CONNECT_PROMPT}]")?,
            PanelBody::Account(view) => write!(f, "{view}")?,
        }
        if let Some(record) = &self.details {
            writeln!(f)?;
            writeln!(f, "Transaction Details")?;
            writeln!(f, "  Transaction Hash: {}", record.transaction_hash)?;
            writeln!(f, "  Gas Used: {}", record.gas_used)?;
            writeln!(f, "  Block Number: {}", record.block_number)?;
            writeln!(f, "  Confirmations: {}", record.confirmations)?;
            writeln!(f, "  [Close]")?;
        }
        Ok(())
    }
}

impl fmt::Display for AccountView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Your Account: {}", self.account)?;
        if let Some(line) = &self.balance {
            match line.value {
                Some(value) => writeln!(f, "Your Balance: {value}")?,
                None => writeln!(f, "Your Balance:")?,
            }
        }
        writeln!(f, "Withdraw amount: {} [Withdraw]", self.withdraw_amount)?;
        writeln!(f, "Deposit amount: {} [Deposit]", self.deposit_amount)?;
        writeln!(f, "[{}] [{}]", self.balance_button(), self.history_button())?;

        if let Some(history) = &self.history {
            writeln!(f)?;
            writeln!(f, "Transaction Receipt")?;
            for (index, record) in history.iter().enumerate() {
                writeln!(f, "  {index}: Transaction Hash: {}", record.transaction_hash)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Transfer ETH")?;
        writeln!(f, "Transfer Amount: {} ETH", self.transfer_amount)?;
        writeln!(f, "Recipient Address: {} [Transfer]", self.recipient)?;
        if let Some(notification) = &self.notification {
            writeln!(f, "{notification}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(byte: u8) -> TransactionRecord {
        TransactionRecord {
            transaction_hash: alloy::primitives::TxHash::repeat_byte(byte),
            gas_used: 42_000,
            block_number: 3,
            confirmations: 2,
        }
    }

    fn account_view() -> AccountView {
        AccountView {
            account: Address::repeat_byte(0x11),
            balance: Some(BalanceLine {
                value: Some(U256::from(1500)),
            }),
            withdraw_amount: "500".into(),
            deposit_amount: "1000".into(),
            history: None,
            transfer_amount: TransferAmount::default(),
            recipient: String::new(),
            notification: None,
        }
    }

    #[test]
    fn test_install_prompt_render() {
        let view = PanelView {
            title: "ATM".into(),
            body: PanelBody::InstallPrompt,
            details: None,
        };
        let text = view.to_string();
        assert!(text.contains(INSTALL_PROMPT));
        assert!(!text.contains("Your Account"));
    }

    #[test]
    fn test_button_labels() {
        let mut view = account_view();
        assert_eq!(view.balance_button(), "Hide Balance");
        assert_eq!(view.history_button(), "Show Transaction History");

        view.balance = None;
        view.history = Some(Vec::new());
        assert_eq!(view.balance_button(), "Show Balance");
        assert_eq!(view.history_button(), "Hide Transaction History");
    }

    #[test]
    fn test_account_render() {
        let mut view = account_view();
        view.history = Some(vec![record(0xaa)]);
        view.notification = Some("done".into());
        let text = PanelView {
            title: "ATM".into(),
            body: PanelBody::Account(view),
            details: Some(record(0xbb)),
        }
        .to_string();

        assert!(text.contains("Your Balance: 1500"));
        assert!(text.contains("Transaction Receipt"));
        assert!(text.contains("0: Transaction Hash: 0xaaaa"));
        assert!(text.contains("Transfer Amount: 0.01 ETH"));
        assert!(text.contains("done"));
        assert!(text.contains("Transaction Details"));
        assert!(text.contains("Gas Used: 42000"));
    }
}
