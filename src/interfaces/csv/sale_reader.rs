use crate::error::{Result, TokeniserError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One sale request. An empty or absent amount is kept as `None` so the sale
/// processor can report it as a missing field.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct SaleRow {
    pub token: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// Reads sale requests from a CSV source with a `token, amount` header.
pub struct SaleReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> SaleReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: super::reader_builder().from_reader(source),
        }
    }

    pub fn sales(self) -> impl Iterator<Item = Result<SaleRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(TokeniserError::from))
    }
}
