use crate::domain::charge::{ChargeRequest, GatewayError, GatewayResult};
use crate::domain::ports::Gateway;
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A deterministic stand-in for a processor's sandbox environment.
///
/// Outcomes depend only on the amount, following the usual sandbox
/// convention of reserving a band of amounts for processor declines:
///
/// | amount              | outcome                               |
/// |---------------------|---------------------------------------|
/// | `<= 0`              | declined with an `amount` field error |
/// | `2000.00..3000.00`  | declined, `Processor Declined`        |
/// | anything else       | `Approved`                            |
#[derive(Debug, Default, Clone, Copy)]
pub struct SandboxGateway;

impl SandboxGateway {
    pub fn new() -> Self {
        Self
    }
}

const DECLINE_FROM: Decimal = dec!(2000);
const DECLINE_UNTIL: Decimal = dec!(3000);

#[async_trait]
impl Gateway for SandboxGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<GatewayResult, GatewayError> {
        if request.amount <= Decimal::ZERO {
            return Ok(GatewayResult::declined(
                "Amount must be greater than zero.",
                vec!["amount: must be greater than zero".to_string()],
            ));
        }
        if (DECLINE_FROM..DECLINE_UNTIL).contains(&request.amount) {
            return Ok(GatewayResult::declined("Processor Declined", Vec::new()));
        }
        Ok(GatewayResult::approved("Approved"))
    }
}
