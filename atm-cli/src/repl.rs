//! Interactive terminal front-end for the account panel.
//!
//! Each input line is one user action; the panel is redrawn after every
//! action, the way a UI framework re-renders after a state change.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use atm::{AccountPanel, WalletProvider};

const HELP: &str = "\
Commands:
  connect            connect your wallet
  balance            show/hide balance
  refresh            fetch the balance again
  history            show/hide transaction history
  deposit [amount]   deposit (uses the deposit field if no amount given)
  withdraw [amount]  withdraw (uses the withdraw field if no amount given)
  amount <eth>       set transfer amount (0.01 to 10, step 0.01)
  to <address>       set transfer recipient
  transfer           send the transfer
  view <n>           show details of history entry n
  close              close transaction details
  help               show this help
  exit               quit";

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Connect the wallet account.
    Connect,
    /// Toggle balance visibility.
    ToggleBalance,
    /// Re-fetch the balance.
    Refresh,
    /// Toggle history visibility.
    ToggleHistory,
    /// Deposit, optionally setting the field first.
    Deposit(Option<String>),
    /// Withdraw, optionally setting the field first.
    Withdraw(Option<String>),
    /// Move the transfer slider.
    Amount(String),
    /// Set the transfer recipient.
    Recipient(String),
    /// Send the transfer.
    Transfer,
    /// Select a history entry.
    View(usize),
    /// Close the detail view.
    Close,
    /// Print help.
    Help,
    /// Leave the REPL.
    Exit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Err("empty command".to_string());
        };
        let arg = parts.next().map(str::to_string);
        let required = |name: &str| {
            arg.clone()
                .ok_or_else(|| format!("'{verb}' needs {name}"))
        };

        Ok(match verb {
            "connect" => Self::Connect,
            "balance" => Self::ToggleBalance,
            "refresh" => Self::Refresh,
            "history" => Self::ToggleHistory,
            "deposit" => Self::Deposit(arg.clone()),
            "withdraw" => Self::Withdraw(arg.clone()),
            "amount" => Self::Amount(required("an amount")?),
            "to" => Self::Recipient(required("an address")?),
            "transfer" => Self::Transfer,
            "view" => {
                let index = required("an index")?;
                Self::View(
                    index
                        .parse()
                        .map_err(|_| format!("'{index}' is not a history index"))?,
                )
            }
            "close" => Self::Close,
            "help" | "?" => Self::Help,
            "exit" | "quit" => Self::Exit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        })
    }
}

/// Drives an [`AccountPanel`] from stdin.
#[derive(Debug)]
pub struct AtmRepl<W: WalletProvider> {
    panel: AccountPanel<W>,
}

impl<W: WalletProvider> AtmRepl<W> {
    /// Wrap a mounted panel.
    #[inline]
    pub const fn new(panel: AccountPanel<W>) -> Self {
        Self { panel }
    }

    /// Apply one command. Returns `false` when the user asked to leave.
    pub async fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Connect => self.panel.connect().await,
            Command::ToggleBalance => self.panel.toggle_balance().await,
            Command::Refresh => self.panel.get_balance().await,
            Command::ToggleHistory => self.panel.toggle_history(),
            Command::Deposit(amount) => {
                if let Some(amount) = amount {
                    self.panel.set_deposit_amount(amount);
                }
                self.panel.deposit().await;
            }
            Command::Withdraw(amount) => {
                if let Some(amount) = amount {
                    self.panel.set_withdraw_amount(amount);
                }
                self.panel.withdraw().await;
            }
            Command::Amount(amount) => {
                if let Err(e) = self.panel.set_transfer_amount(&amount) {
                    println!("{e}");
                }
            }
            Command::Recipient(address) => self.panel.set_recipient(address),
            Command::Transfer => self.panel.transfer().await,
            Command::View(index) => {
                if !self.panel.select_transaction(index) {
                    println!("No transaction #{index} in history.");
                }
            }
            Command::Close => self.panel.close_details(),
            Command::Help => println!("{HELP}"),
            Command::Exit => return false,
        }
        true
    }

    /// Run the interactive loop until `exit` or end of input.
    pub async fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        println!("{}", self.panel.view());
        println!("(type 'help' for commands, 'exit' to quit)");

        loop {
            print!("> ");
            stdout.flush()?;

            let mut input = String::new();
            if stdin.lock().read_line(&mut input)? == 0 {
                break;
            }
            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            let command = match input.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            };
            let redraw = !matches!(command, Command::Help);
            if !self.apply(command).await {
                break;
            }
            if redraw {
                println!();
                println!("{}", self.panel.view());
            }
        }

        Ok(())
    }

    /// The driven panel.
    #[inline]
    pub const fn panel(&self) -> &AccountPanel<W> {
        &self.panel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("connect".parse::<Command>().unwrap(), Command::Connect);
        assert_eq!(
            "deposit 250".parse::<Command>().unwrap(),
            Command::Deposit(Some("250".into()))
        );
        assert_eq!("withdraw".parse::<Command>().unwrap(), Command::Withdraw(None));
        assert_eq!(
            "amount 0.5".parse::<Command>().unwrap(),
            Command::Amount("0.5".into())
        );
        assert_eq!("view 3".parse::<Command>().unwrap(), Command::View(3));
        assert_eq!("quit".parse::<Command>().unwrap(), Command::Exit);
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Command>().is_err());
        assert!("amount".parse::<Command>().is_err());
        assert!("to".parse::<Command>().is_err());
        assert!("view x".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().unwrap_err().contains("unknown command"));
    }

    #[tokio::test]
    async fn test_apply_without_wallet() {
        let panel: AccountPanel<atm::EvmWalletProvider> =
            AccountPanel::mount(atm::AtmConfig::default(), None);
        let mut repl = AtmRepl::new(panel);

        assert!(repl.apply(Command::Connect).await);
        assert!(repl.apply(Command::Close).await);
        assert!(!repl.apply(Command::Exit).await);
        assert!(repl.panel().view().is_install_prompt());
    }
}
