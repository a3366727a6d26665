use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Machine-distinguishable classification of every failure the vault reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidCardNumber,
    InvalidExpiry,
    MissingField,
    UnknownToken,
    SaleFailed,
    TokenIssuanceExhausted,
    GatewayUnavailable,
    GenerationFailed,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidCardNumber => "invalid_card_number",
            ErrorKind::InvalidExpiry => "invalid_expiry",
            ErrorKind::MissingField => "missing_field",
            ErrorKind::UnknownToken => "unknown_token",
            ErrorKind::SaleFailed => "sale_failed",
            ErrorKind::TokenIssuanceExhausted => "token_issuance_exhausted",
            ErrorKind::GatewayUnavailable => "gateway_unavailable",
            ErrorKind::GenerationFailed => "generation_failed",
            ErrorKind::Storage => "storage",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local card validation failures. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Credit card number not valid")]
    InvalidCardNumber,
    #[error("Credit card expiration date not valid. Format MM/YY")]
    InvalidExpiry,
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::InvalidCardNumber => ErrorKind::InvalidCardNumber,
            ValidationError::InvalidExpiry => ErrorKind::InvalidExpiry,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("token length {len} not supported (expected 1..={max})")]
    UnsupportedLength { len: usize, max: usize },
    #[error("random source produced no {len}-digit value after {draws} draws")]
    Exhausted { len: usize, draws: u32 },
}

/// Failures raised by the card and token store backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The token value is already owned by another token record.
    #[error("token value already issued")]
    Conflict,
    #[error("record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("Internal storage error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum TokeniseError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("token generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("no unique token issued after {attempts} attempts")]
    TokenIssuanceExhausted { attempts: u32 },
    #[error("vault storage failed: {0}")]
    Store(#[from] StoreError),
}

impl TokeniseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokeniseError::Validation(e) => e.kind(),
            TokeniseError::Generation(_) => ErrorKind::GenerationFailed,
            TokeniseError::TokenIssuanceExhausted { .. } => ErrorKind::TokenIssuanceExhausted,
            TokeniseError::Store(_) => ErrorKind::Storage,
        }
    }
}

#[derive(Error, Debug)]
pub enum SaleError {
    #[error("{0} is missing.")]
    MissingField(&'static str),
    #[error("token is not known to the vault")]
    UnknownToken,
    /// The processor declined the charge. `field_errors` carries every
    /// per-field validation message the gateway reported.
    #[error("{message}")]
    SaleFailed {
        message: String,
        field_errors: Vec<String>,
    },
    #[error("payment gateway unavailable after {attempts} attempts: {reason}")]
    GatewayUnavailable { attempts: u32, reason: String },
    #[error("vault storage failed: {0}")]
    Store(#[from] StoreError),
}

impl SaleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SaleError::MissingField(_) => ErrorKind::MissingField,
            SaleError::UnknownToken => ErrorKind::UnknownToken,
            SaleError::SaleFailed { .. } => ErrorKind::SaleFailed,
            SaleError::GatewayUnavailable { .. } => ErrorKind::GatewayUnavailable,
            SaleError::Store(_) => ErrorKind::Storage,
        }
    }
}

/// Errors raised by the batch front end.
#[derive(Error, Debug)]
pub enum TokeniserError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    StoreError(#[from] StoreError),
}

pub type Result<T, E = TokeniserError> = std::result::Result<T, E>;
