use super::card::mask_pan;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// A charge forwarded to the payment gateway on behalf of a token holder.
#[derive(Clone, PartialEq)]
pub struct ChargeRequest {
    pub pan: String,
    pub expiry: String,
    pub amount: Decimal,
}

impl fmt::Debug for ChargeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChargeRequest")
            .field("pan", &mask_pan(&self.pan))
            .field("expiry", &self.expiry)
            .field("amount", &self.amount)
            .finish()
    }
}

/// The processor's answer to a charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResult {
    pub success: bool,
    /// Processor response text on success, aggregate error message otherwise.
    pub message: String,
    pub field_errors: Vec<String>,
}

impl GatewayResult {
    pub fn approved(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    pub fn declined(message: impl Into<String>, field_errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            field_errors,
        }
    }
}

/// Transport-level failures talking to the gateway.
///
/// A processor decline is not a `GatewayError`; it is a `GatewayResult` with
/// `success == false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("gateway call timed out")]
    Timeout,
    #[error("gateway connection failed: {0}")]
    Connection(String),
    /// The exchange itself was rejected (bad credentials, malformed reply).
    #[error("gateway protocol error: {0}")]
    Protocol(String),
}

impl GatewayError {
    /// Whether the charge may be sent again without risking a double charge.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Timeout | GatewayError::Connection(_))
    }
}
