use super::vault::TokenVault;
use crate::config::GatewayPolicy;
use crate::domain::charge::{ChargeRequest, GatewayError, GatewayResult};
use crate::domain::ports::GatewayBox;
use crate::error::SaleError;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Exchanges a token for a charge against the payment gateway.
pub struct SaleProcessor {
    vault: Arc<TokenVault>,
    gateway: GatewayBox,
    policy: GatewayPolicy,
}

impl SaleProcessor {
    pub fn new(vault: Arc<TokenVault>, gateway: GatewayBox, policy: GatewayPolicy) -> Self {
        Self {
            vault,
            gateway,
            policy,
        }
    }

    /// Charges `amount` to the card behind `token`.
    ///
    /// Returns the processor's confirmation message. A token stays valid after
    /// a sale and can be charged again.
    pub async fn sale(&self, token: &str, amount: Option<Decimal>) -> Result<String, SaleError> {
        if token.trim().is_empty() {
            return Err(SaleError::MissingField("Token"));
        }
        let amount = amount.ok_or(SaleError::MissingField("Amount"))?;

        let card = self
            .vault
            .lookup_by_token(token)
            .await?
            .ok_or(SaleError::UnknownToken)?;

        let request = ChargeRequest {
            pan: card.pan,
            expiry: card.expiry,
            amount,
        };
        let result = self.charge(&request).await?;

        if result.success {
            info!(card_id = %card.id, %amount, response = %result.message, "sale approved");
            return Ok(result.message);
        }

        for field_error in &result.field_errors {
            error!(card_id = %card.id, %field_error, "gateway validation error");
        }
        warn!(card_id = %card.id, %amount, message = %result.message, "sale declined");
        Err(SaleError::SaleFailed {
            message: result.message,
            field_errors: result.field_errors,
        })
    }

    /// Sends the charge, retrying transport faults under the policy. The
    /// returned result may still be a decline, which is never retried.
    async fn charge(&self, request: &ChargeRequest) -> Result<GatewayResult, SaleError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let outcome = tokio::time::timeout(self.policy.timeout, self.gateway.charge(request))
                .await
                .unwrap_or(Err(GatewayError::Timeout));

            match outcome {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    let delay = self.policy.backoff_for(attempt);
                    warn!(attempt, error = %e, ?delay, "gateway transport failure, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(attempt, error = %e, "gateway unavailable");
                    return Err(SaleError::GatewayUnavailable {
                        attempts: attempt,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::vault::tests::ScriptedGenerator;
    use crate::config::VaultConfig;
    use crate::domain::generator::SecureTokenGenerator;
    use crate::domain::ports::Gateway;
    use crate::error::ErrorKind;
    use crate::infrastructure::in_memory::{InMemoryCardStore, InMemoryTokenStore};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Replays scripted gateway outcomes and records every request it sees.
    #[derive(Default)]
    struct ScriptedGateway {
        outcomes: Mutex<VecDeque<Result<GatewayResult, GatewayError>>>,
        requests: Mutex<Vec<ChargeRequest>>,
        delay: Option<Duration>,
        calls: AtomicU32,
    }

    impl ScriptedGateway {
        fn replying(outcomes: Vec<Result<GatewayResult, GatewayError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
                ..Default::default()
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Gateway for Arc<ScriptedGateway> {
        async fn charge(&self, request: &ChargeRequest) -> Result<GatewayResult, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(GatewayResult::approved("Approved")))
        }
    }

    fn fast_policy() -> GatewayPolicy {
        GatewayPolicy {
            timeout: Duration::from_secs(5),
            max_attempts: 3,
            backoff: Duration::from_millis(1),
        }
    }

    async fn setup(
        gateway: Arc<ScriptedGateway>,
        policy: GatewayPolicy,
    ) -> (SaleProcessor, String) {
        let vault = Arc::new(TokenVault::new(
            Box::new(InMemoryCardStore::new()),
            Box::new(InMemoryTokenStore::new()),
            Box::new(SecureTokenGenerator::new()),
            VaultConfig::default(),
        ));
        let token = vault.tokenise("4111111111111111", "10/22").await.unwrap();
        let processor = SaleProcessor::new(vault, Box::new(gateway), policy);
        (processor, token.value)
    }

    #[tokio::test]
    async fn test_sale_approved() {
        let gateway = ScriptedGateway::replying(vec![Ok(GatewayResult::approved("Approved"))]);
        let (processor, token) = setup(gateway.clone(), fast_policy()).await;

        let outcome = processor.sale(&token, Some(dec!(5002))).await.unwrap();
        assert_eq!(outcome, "Approved");

        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].pan, "4111111111111111");
        assert_eq!(requests[0].expiry, "10/22");
        assert_eq!(requests[0].amount, dec!(5002));
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let gateway = ScriptedGateway::replying(vec![]);
        let (processor, token) = setup(gateway.clone(), fast_policy()).await;

        let err = processor.sale("", Some(dec!(10))).await.unwrap_err();
        assert!(matches!(err, SaleError::MissingField("Token")));

        let err = processor.sale("  ", Some(dec!(10))).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);

        let err = processor.sale(&token, None).await.unwrap_err();
        assert!(matches!(err, SaleError::MissingField("Amount")));

        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let gateway = ScriptedGateway::replying(vec![]);
        let (processor, _) = setup(gateway.clone(), fast_policy()).await;

        let err = processor
            .sale("nonexistent-token", Some(dec!(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, SaleError::UnknownToken));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_decline_keeps_field_errors_and_is_not_retried() {
        let gateway = ScriptedGateway::replying(vec![Ok(GatewayResult::declined(
            "Credit card number is invalid.",
            vec![
                "Credit card number is invalid.".to_string(),
                "Expiration date is invalid.".to_string(),
            ],
        ))]);
        let (processor, token) = setup(gateway.clone(), fast_policy()).await;

        let err = processor.sale(&token, Some(dec!(10))).await.unwrap_err();
        match err {
            SaleError::SaleFailed {
                message,
                field_errors,
            } => {
                assert_eq!(message, "Credit card number is invalid.");
                assert_eq!(field_errors.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_failures_are_retried() {
        let gateway = ScriptedGateway::replying(vec![
            Err(GatewayError::Connection("connection reset".into())),
            Err(GatewayError::Timeout),
            Ok(GatewayResult::approved("Approved")),
        ]);
        let (processor, token) = setup(gateway.clone(), fast_policy()).await;

        let outcome = processor.sale(&token, Some(dec!(55))).await.unwrap();
        assert_eq!(outcome, "Approved");
        assert_eq!(gateway.calls(), 3);
    }

    #[tokio::test]
    async fn test_gateway_unavailable_after_policy_exhausted() {
        let gateway = ScriptedGateway::replying(vec![
            Err(GatewayError::Timeout),
            Err(GatewayError::Timeout),
            Err(GatewayError::Timeout),
            Ok(GatewayResult::approved("Approved")),
        ]);
        let (processor, token) = setup(gateway.clone(), fast_policy()).await;

        let err = processor.sale(&token, Some(dec!(55))).await.unwrap_err();
        assert!(matches!(
            err,
            SaleError::GatewayUnavailable { attempts: 3, .. }
        ));
        assert_eq!(gateway.calls(), 3);
    }

    #[tokio::test]
    async fn test_protocol_error_is_not_retried() {
        let gateway = ScriptedGateway::replying(vec![Err(GatewayError::Protocol(
            "authentication failed".into(),
        ))]);
        let (processor, token) = setup(gateway.clone(), fast_policy()).await;

        let err = processor.sale(&token, Some(dec!(55))).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GatewayUnavailable);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_slow_gateway_hits_timeout() {
        let gateway = Arc::new(ScriptedGateway {
            delay: Some(Duration::from_millis(500)),
            ..Default::default()
        });
        let policy = GatewayPolicy {
            timeout: Duration::from_millis(20),
            max_attempts: 2,
            backoff: Duration::from_millis(1),
        };
        let (processor, token) = setup(gateway.clone(), policy).await;

        let err = processor.sale(&token, Some(dec!(55))).await.unwrap_err();
        match err {
            SaleError::GatewayUnavailable { attempts, reason } => {
                assert_eq!(attempts, 2);
                assert_eq!(reason, GatewayError::Timeout.to_string());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_token_can_be_charged_repeatedly() {
        let gateway = ScriptedGateway::replying(vec![]);
        let (processor, token) = setup(gateway.clone(), fast_policy()).await;

        for _ in 0..3 {
            assert_eq!(processor.sale(&token, Some(dec!(1))).await.unwrap(), "Approved");
        }
        assert_eq!(gateway.calls(), 3);
    }

    #[tokio::test]
    async fn test_scripted_token_value_is_chargeable() {
        let vault = Arc::new(TokenVault::new(
            Box::new(InMemoryCardStore::new()),
            Box::new(InMemoryTokenStore::new()),
            Box::new(ScriptedGenerator::new(&["4000000000000002"])),
            VaultConfig::default(),
        ));
        vault.tokenise("5555555555554444", "11/30").await.unwrap();
        let processor = SaleProcessor::new(
            vault,
            Box::new(ScriptedGateway::replying(vec![])),
            fast_policy(),
        );

        assert_eq!(
            processor.sale("4000000000000002", Some(dec!(1))).await.unwrap(),
            "Approved"
        );
    }
}
