use crate::domain::card::{Card, CardId, CardRecord};
use crate::domain::ports::{CardStore, TokenStore};
use crate::domain::token::TokenRecord;
use crate::error::StoreError;
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing card records, keyed by card id.
pub const CF_CARDS: &str = "cards";
/// Column Family for storing token records, keyed by token value.
pub const CF_TOKENS: &str = "tokens";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both `CardRecord` and `TokenRecord` entities using
/// separate Column Families. Keying tokens by their value turns the
/// uniqueness rule into a key-existence check.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    // RocksDB's LOCK file keeps other processes out; this serialises
    // check-and-put within the process.
    token_guard: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("cards" and "tokens") exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_cards = ColumnFamilyDescriptor::new(CF_CARDS, Options::default());
        let cf_tokens = ColumnFamilyDescriptor::new(CF_TOKENS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_cards, cf_tokens])?;

        Ok(Self {
            db: Arc::new(db),
            token_guard: Arc::new(Mutex::new(())),
        })
    }

    fn missing_cf(name: &str) -> StoreError {
        StoreError::InternalError(format!("column family '{name}' not found").into())
    }
}

#[async_trait]
impl CardStore for RocksDBStore {
    async fn store(&self, card: Card) -> Result<CardRecord, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_CARDS)
            .ok_or_else(|| Self::missing_cf(CF_CARDS))?;

        let record = card.into_record(CardId::new());
        let value = serde_json::to_vec(&record)?;
        self.db.put_cf(&cf, record.id.as_bytes(), value)?;

        Ok(record)
    }

    async fn get(&self, id: CardId) -> Result<Option<CardRecord>, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_CARDS)
            .ok_or_else(|| Self::missing_cf(CF_CARDS))?;

        match self.db.get_cf(&cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, id: CardId) -> Result<(), StoreError> {
        let cf = self
            .db
            .cf_handle(CF_CARDS)
            .ok_or_else(|| Self::missing_cf(CF_CARDS))?;

        self.db.delete_cf(&cf, id.as_bytes())?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for RocksDBStore {
    async fn insert(&self, value: String, card_id: CardId) -> Result<TokenRecord, StoreError> {
        let _guard = self.token_guard.lock().await;
        let cf = self
            .db
            .cf_handle(CF_TOKENS)
            .ok_or_else(|| Self::missing_cf(CF_TOKENS))?;

        if self.db.get_pinned_cf(&cf, value.as_bytes())?.is_some() {
            return Err(StoreError::Conflict);
        }

        let token = TokenRecord::new(value, card_id);
        let bytes = serde_json::to_vec(&token)?;
        self.db.put_cf(&cf, token.value.as_bytes(), bytes)?;

        Ok(token)
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<TokenRecord>, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_TOKENS)
            .ok_or_else(|| Self::missing_cf(CF_TOKENS))?;

        match self.db.get_cf(&cf, value.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}
