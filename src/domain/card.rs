use super::validator::{normalize_number, validate_expiry, validate_number};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Storage-assigned identifier of a persisted card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(Uuid);

impl CardId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Renders a PAN with every digit but the last four replaced by `*`.
pub fn mask_pan(pan: &str) -> String {
    let visible = pan.len().saturating_sub(4);
    pan.chars()
        .enumerate()
        .map(|(i, c)| if i < visible { '*' } else { c })
        .collect()
}

/// A validated card that has not been persisted yet.
///
/// The only way to build one is [`Card::new`], so the vault never stores a
/// number that fails Luhn or an expiry that is not `MM/YY`.
#[derive(Clone, PartialEq, Eq)]
pub struct Card {
    pan: String,
    expiry: String,
}

impl Card {
    /// Validates and normalises the raw input.
    pub fn new(pan: &str, expiry: &str) -> Result<Self, ValidationError> {
        validate_number(pan)?;
        validate_expiry(expiry)?;
        Ok(Self {
            pan: normalize_number(pan),
            expiry: expiry.to_string(),
        })
    }

    pub fn pan(&self) -> &str {
        &self.pan
    }

    pub fn expiry(&self) -> &str {
        &self.expiry
    }

    /// Attaches the identifier assigned by the store.
    pub fn into_record(self, id: CardId) -> CardRecord {
        CardRecord {
            id,
            pan: self.pan,
            expiry: self.expiry,
        }
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("pan", &mask_pan(&self.pan))
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// A card as persisted in the vault. Append-only.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: CardId,
    pub pan: String,
    pub expiry: String,
}

impl CardRecord {
    pub fn masked_pan(&self) -> String {
        mask_pan(&self.pan)
    }
}

impl fmt::Debug for CardRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardRecord")
            .field("id", &self.id)
            .field("pan", &self.masked_pan())
            .field("expiry", &self.expiry)
            .finish()
    }
}
