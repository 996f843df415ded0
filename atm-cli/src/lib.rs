//! ATM CLI library: a terminal front-end for the bank ATM client.
//!
//! This crate renders an [`atm::AccountPanel`] as text and maps typed
//! commands onto its handlers.

pub mod repl;

pub use repl::{AtmRepl, Command};
