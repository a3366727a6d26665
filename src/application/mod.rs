//! Application layer containing the vault orchestration.
//!
//! `TokenVault` validates cards and issues tokens against the store ports;
//! `SaleProcessor` resolves tokens and drives the payment gateway. Both are
//! wired explicitly by the caller.

pub mod sale;
pub mod vault;
