use crate::error::GenerationError;
use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};
use std::sync::{Mutex, PoisonError};

/// Longest token a single `u128` draw can reliably cover.
pub const MAX_TOKEN_LENGTH: usize = 38;

/// Default number of draws before giving up on a short random value.
pub const DEFAULT_MAX_DRAWS: u32 = 16;

/// Produces surrogate digit strings.
///
/// Implementations only guarantee the shape of the value (`len` decimal
/// digits). Uniqueness is the store's job.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self, len: usize) -> Result<String, GenerationError>;

    /// Fails with [`GenerationError::UnsupportedLength`] when `generate`
    /// could never produce a token of `len` digits.
    fn check_length(&self, len: usize) -> Result<(), GenerationError> {
        if len == 0 || len > MAX_TOKEN_LENGTH {
            return Err(GenerationError::UnsupportedLength {
                len,
                max: MAX_TOKEN_LENGTH,
            });
        }
        Ok(())
    }
}

pub type TokenGeneratorBox = Box<dyn TokenGenerator>;

/// Draws token digits from a cryptographically secure random source.
///
/// Each draw is a `u128` rendered in decimal. A draw shorter than the
/// requested length is discarded and redrawn, at most `max_draws` times; the
/// rightmost `len` digits of the first long-enough draw become the token.
///
/// The source is shared behind a mutex so that stateful generators advance
/// on every draw.
#[derive(Debug)]
pub struct SecureTokenGenerator<R = OsRng> {
    rng: Mutex<R>,
    max_draws: u32,
}

impl SecureTokenGenerator {
    pub fn new() -> Self {
        Self::with_rng(OsRng)
    }
}

impl Default for SecureTokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> SecureTokenGenerator<R>
where
    R: RngCore + CryptoRng + Send,
{
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
            max_draws: DEFAULT_MAX_DRAWS,
        }
    }
}

impl<R> SecureTokenGenerator<R> {

    pub fn max_draws(mut self, max_draws: u32) -> Self {
        self.max_draws = max_draws;
        self
    }
}

impl<R> TokenGenerator for SecureTokenGenerator<R>
where
    R: RngCore + Send,
{
    fn generate(&self, len: usize) -> Result<String, GenerationError> {
        self.check_length(len)?;

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        for _ in 0..self.max_draws {
            let rendered = rng.r#gen::<u128>().to_string();
            if rendered.len() >= len {
                return Ok(rendered[rendered.len() - len..].to_string());
            }
        }

        Err(GenerationError::Exhausted {
            len,
            draws: self.max_draws,
        })
    }
}
