use crate::domain::card::{Card, CardId, CardRecord};
use crate::domain::ports::{CardStore, TokenStore};
use crate::domain::token::TokenRecord;
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for card records.
///
/// Uses `Arc<RwLock<HashMap<CardId, CardRecord>>>` to allow shared concurrent access.
/// Ideal for testing or short-lived runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryCardStore {
    cards: Arc<RwLock<HashMap<CardId, CardRecord>>>,
}

impl InMemoryCardStore {
    /// Creates a new, empty in-memory card store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.cards.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cards.read().await.is_empty()
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn store(&self, card: Card) -> Result<CardRecord, StoreError> {
        let record = card.into_record(CardId::new());
        let mut cards = self.cards.write().await;
        cards.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: CardId) -> Result<Option<CardRecord>, StoreError> {
        let cards = self.cards.read().await;
        Ok(cards.get(&id).cloned())
    }

    async fn remove(&self, id: CardId) -> Result<(), StoreError> {
        self.cards.write().await.remove(&id);
        Ok(())
    }
}

/// A thread-safe in-memory store for tokens, keyed by token value.
///
/// The uniqueness check and the insert happen under the same write guard, so
/// two concurrent issuers can never claim the same value.
#[derive(Default, Clone)]
pub struct InMemoryTokenStore {
    tokens: Arc<RwLock<HashMap<String, TokenRecord>>>,
}

impl InMemoryTokenStore {
    /// Creates a new, empty in-memory token store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn insert(&self, value: String, card_id: CardId) -> Result<TokenRecord, StoreError> {
        let mut tokens = self.tokens.write().await;
        match tokens.entry(value) {
            Entry::Occupied(_) => Err(StoreError::Conflict),
            Entry::Vacant(slot) => {
                let token = TokenRecord::new(slot.key().clone(), card_id);
                Ok(slot.insert(token).clone())
            }
        }
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<TokenRecord>, StoreError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(value).cloned())
    }
}
