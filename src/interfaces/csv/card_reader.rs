use crate::error::{Result, TokeniserError};
use serde::Deserialize;
use std::io::Read;

/// One card to tokenise, as it appears in the input file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CardRow {
    pub pan: String,
    pub expiry: String,
}

/// Reads cards from a CSV source with a `pan, expiry` header.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<CardRow>`.
/// It handles whitespace trimming around fields automatically; whitespace
/// inside a card number is left for the validator to strip.
pub struct CardReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CardReader<R> {
    /// Creates a new `CardReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self {
            reader: super::reader_builder().from_reader(source),
        }
    }

    /// Returns an iterator that lazily reads and deserializes cards.
    pub fn cards(self) -> impl Iterator<Item = Result<CardRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(TokeniserError::from))
    }
}
