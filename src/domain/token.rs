use super::card::CardId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(Uuid);

impl TokenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A surrogate issued for a card.
///
/// `value` has the same number of digits as the card's PAN and is unique
/// across the vault. Tokens are never revoked and may back any number of sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: TokenId,
    pub value: String,
    pub card_id: CardId,
}

impl TokenRecord {
    pub fn new(value: String, card_id: CardId) -> Self {
        Self {
            id: TokenId::new(),
            value,
            card_id,
        }
    }
}
