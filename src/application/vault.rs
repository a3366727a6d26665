use crate::config::VaultConfig;
use crate::domain::card::{Card, CardRecord};
use crate::domain::generator::TokenGeneratorBox;
use crate::domain::ports::{CardStoreBox, TokenStoreBox};
use crate::domain::token::TokenRecord;
use crate::error::{StoreError, TokeniseError};
use tracing::{debug, error, info, warn};

/// The token vault: owns card and token records and the generator that
/// produces new surrogates.
pub struct TokenVault {
    card_store: CardStoreBox,
    token_store: TokenStoreBox,
    generator: TokenGeneratorBox,
    config: VaultConfig,
}

impl TokenVault {
    /// Creates a new `TokenVault` instance.
    ///
    /// # Arguments
    ///
    /// * `card_store` - The store for card records.
    /// * `token_store` - The store for issued tokens.
    /// * `generator` - Source of candidate token values.
    /// * `config` - Issuance limits.
    pub fn new(
        card_store: CardStoreBox,
        token_store: TokenStoreBox,
        generator: TokenGeneratorBox,
        config: VaultConfig,
    ) -> Self {
        Self {
            card_store,
            token_store,
            generator,
            config,
        }
    }

    /// Validates a card, stores it and issues a fresh token for it.
    ///
    /// Tokenising the same card twice stores it twice and yields two distinct
    /// tokens. A request that fails leaves no card record behind.
    pub async fn tokenise(&self, pan: &str, expiry: &str) -> Result<TokenRecord, TokeniseError> {
        let card = Card::new(pan, expiry)?;
        self.generator.check_length(card.pan().len())?;
        if self.config.max_issue_attempts == 0 {
            return Err(TokeniseError::TokenIssuanceExhausted { attempts: 0 });
        }

        let record = self.store_card(card).await?;
        match self.issue_token(&record).await {
            Ok(token) => Ok(token),
            Err(e) => {
                if let Err(cleanup) = self.card_store.remove(record.id).await {
                    error!(
                        card_id = %record.id,
                        error = %cleanup,
                        "failed to remove untokenised card"
                    );
                }
                Err(e)
            }
        }
    }

    pub async fn store_card(&self, card: Card) -> Result<CardRecord, StoreError> {
        let record = self.card_store.store(card).await?;
        debug!(card_id = %record.id, card = %record.masked_pan(), "card stored");
        Ok(record)
    }

    /// Issues a new token for an already stored card.
    ///
    /// Each attempt generates a candidate and tries to claim it in the token
    /// store. A candidate that is already issued, or that equals the card's
    /// own number, is discarded and counts as a failed attempt.
    pub async fn issue_token(&self, card: &CardRecord) -> Result<TokenRecord, TokeniseError> {
        let attempts = self.config.max_issue_attempts;

        for attempt in 1..=attempts {
            let candidate = self.generator.generate(card.pan.len())?;
            if candidate == card.pan {
                debug!(attempt, card_id = %card.id, "candidate equals card number, regenerating");
                continue;
            }

            match self.token_store.insert(candidate, card.id).await {
                Ok(token) => {
                    info!(token_id = %token.id, card_id = %card.id, attempt, "token issued");
                    return Ok(token);
                }
                Err(StoreError::Conflict) => {
                    warn!(attempt, card_id = %card.id, "token collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(TokeniseError::TokenIssuanceExhausted { attempts })
    }

    /// Resolves a token value to the card it stands for.
    pub async fn lookup_by_token(&self, value: &str) -> Result<Option<CardRecord>, StoreError> {
        let Some(token) = self.token_store.find_by_value(value).await? else {
            return Ok(None);
        };

        match self.card_store.get(token.card_id).await? {
            Some(card) => Ok(Some(card)),
            None => Err(StoreError::InternalError(
                format!("token {} references missing card {}", token.id, token.card_id).into(),
            )),
        }
    }
}
