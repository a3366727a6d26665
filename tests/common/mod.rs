#![allow(dead_code)]

use async_trait::async_trait;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokeniser::application::vault::TokenVault;
use tokeniser::config::VaultConfig;
use tokeniser::domain::charge::{ChargeRequest, GatewayError, GatewayResult};
use tokeniser::domain::generator::SecureTokenGenerator;
use tokeniser::domain::ports::Gateway;
use tokeniser::infrastructure::in_memory::{InMemoryCardStore, InMemoryTokenStore};

/// Appends the Luhn check digit to `prefix`.
pub fn luhn_complete(prefix: &str) -> String {
    let sum: u32 = prefix
        .chars()
        .rev()
        .enumerate()
        .map(|(i, c)| {
            let d = c.to_digit(10).unwrap();
            // The check digit will sit at distance 0, so prefix digits start at 1.
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    format!("{prefix}{}", (10 - sum % 10) % 10)
}

/// Writes `rows` distinct Luhn-valid 16-digit cards with a `pan, expiry` header.
pub fn generate_cards_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["pan", "expiry"])?;
    for i in 0..rows {
        let pan = luhn_complete(&format!("4{:014}", i));
        wtr.write_record([pan.as_str(), "10/30"])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn in_memory_vault() -> Arc<TokenVault> {
    Arc::new(TokenVault::new(
        Box::new(InMemoryCardStore::new()),
        Box::new(InMemoryTokenStore::new()),
        Box::new(SecureTokenGenerator::new()),
        VaultConfig::default(),
    ))
}

/// A gateway that answers every charge with the same result. Clones share
/// the call counter.
#[derive(Clone)]
pub struct StubGateway {
    result: GatewayResult,
    calls: Arc<AtomicU32>,
}

impl StubGateway {
    pub fn new(result: GatewayResult) -> Self {
        Self {
            result,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Gateway for StubGateway {
    async fn charge(&self, _request: &ChargeRequest) -> Result<GatewayResult, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}
