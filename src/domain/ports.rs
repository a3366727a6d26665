use super::card::{Card, CardId, CardRecord};
use super::charge::{ChargeRequest, GatewayError, GatewayResult};
use super::token::TokenRecord;
use crate::error::StoreError;
use async_trait::async_trait;

#[async_trait]
pub trait CardStore: Send + Sync {
    /// Persists a validated card and returns it with its assigned id.
    async fn store(&self, card: Card) -> Result<CardRecord, StoreError>;
    async fn get(&self, id: CardId) -> Result<Option<CardRecord>, StoreError>;
    /// Deletes a card record. Removing an unknown id is not an error.
    async fn remove(&self, id: CardId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persists a new token for `card_id`.
    ///
    /// Uniqueness of `value` is checked and claimed atomically: a value that
    /// is already issued fails with [`StoreError::Conflict`] and nothing is
    /// written.
    async fn insert(&self, value: String, card_id: CardId) -> Result<TokenRecord, StoreError>;
    async fn find_by_value(&self, value: &str) -> Result<Option<TokenRecord>, StoreError>;
}

/// The external payment processor.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn charge(&self, request: &ChargeRequest) -> Result<GatewayResult, GatewayError>;
}

pub type CardStoreBox = Box<dyn CardStore>;
pub type TokenStoreBox = Box<dyn TokenStore>;
pub type GatewayBox = Box<dyn Gateway>;
