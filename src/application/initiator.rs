use crate::config::CheckoutConfig;
use crate::domain::cart::CartSnapshot;
use crate::domain::ports::{LocalStorage, PaymentGateway};
use crate::domain::session::{CheckoutCallbacks, CheckoutSession, TrustedPrefix};
use crate::error::{CheckoutError, Result};
use tracing::{debug, info, warn};

/// Creates payment sessions.
///
/// Each call to [`CheckoutInitiator::initiate`] issues at most one session-creation
/// request. Failures are returned to the caller and never retried here, so a
/// retry always comes from an explicit user action.
pub struct CheckoutInitiator {
    callbacks: CheckoutCallbacks,
    trusted_prefix: TrustedPrefix,
    preserved_keys: Vec<String>,
}

impl CheckoutInitiator {
    pub fn new(config: &CheckoutConfig) -> Result<Self> {
        Ok(Self {
            callbacks: CheckoutCallbacks::from_origin(&config.origin()?)?,
            trusted_prefix: TrustedPrefix::new(config.trusted_prefix_url()?),
            preserved_keys: config.preserved_storage_keys.clone(),
        })
    }

    pub async fn initiate(
        &self,
        gateway: &dyn PaymentGateway,
        storage: &dyn LocalStorage,
        cart: &CartSnapshot,
    ) -> Result<CheckoutSession> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        self.prune_storage(storage).await;

        info!(
            items = cart.item_count(),
            subtotal = %cart.subtotal(),
            "Creating checkout session"
        );
        let response = gateway
            .create_checkout_session(&self.callbacks.to_request())
            .await?;

        let raw = response
            .checkout_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or(CheckoutError::MalformedCheckoutUrl { url: None })?;

        let checkout_url = self.trusted_prefix.admit(&raw).ok_or_else(|| {
            warn!(
                url = %raw,
                trusted = self.trusted_prefix.as_str(),
                "Rejecting untrusted checkout URL"
            );
            CheckoutError::MalformedCheckoutUrl {
                url: Some(raw.clone()),
            }
        })?;

        Ok(CheckoutSession {
            checkout_url,
            raw_checkout_url: raw,
            success_url: self.callbacks.success_url.clone(),
            cancel_url: self.callbacks.cancel_url.clone(),
        })
    }

    /// Drops non-essential local data to avoid quota errors during the redirect.
    /// Best effort: failures are logged and ignored.
    async fn prune_storage(&self, storage: &dyn LocalStorage) {
        let keys = match storage.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Could not list local storage keys: {e}");
                return;
            }
        };

        for key in keys {
            if self.preserved_keys.iter().any(|kept| kept == &key) {
                continue;
            }
            match storage.remove(&key).await {
                Ok(()) => debug!(key = %key, "Pruned local storage entry"),
                Err(e) => warn!(key = %key, "Could not prune local storage entry: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::CartItem;
    use crate::domain::session::{CreateSessionRequest, CreateSessionResponse, SessionId};
    use crate::domain::verification::VerificationResult;
    use crate::infrastructure::in_memory::InMemoryStorage;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct FixedGateway {
        response: Mutex<Option<Result<CreateSessionResponse>>>,
        requests: Mutex<Vec<CreateSessionRequest>>,
    }

    impl FixedGateway {
        fn returning(response: Result<CreateSessionResponse>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn url(url: &str) -> Self {
            Self::returning(Ok(CreateSessionResponse {
                checkout_url: Some(url.to_string()),
            }))
        }
    }

    #[async_trait]
    impl PaymentGateway for FixedGateway {
        async fn create_checkout_session(
            &self,
            request: &CreateSessionRequest,
        ) -> Result<CreateSessionResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.response
                .lock()
                .unwrap()
                .take()
                .expect("only one request expected")
        }

        async fn verify_checkout_session(&self, _: &SessionId) -> Result<VerificationResult> {
            unreachable!("initiator never verifies")
        }
    }

    fn initiator() -> CheckoutInitiator {
        CheckoutInitiator::new(&CheckoutConfig {
            site_origin: "https://shop.example.com".to_string(),
            trusted_checkout_prefix: "https://pay.example.com/".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn cart() -> CartSnapshot {
        CartSnapshot::new(vec![CartItem {
            product_id: "sku-1".to_string(),
            quantity: 1,
            unit_price: dec!(25.00),
        }])
    }

    #[tokio::test]
    async fn test_single_request_with_absolute_callbacks() {
        let gateway = FixedGateway::url("https://pay.example.com/cs_123");
        let storage = InMemoryStorage::new();

        let session = initiator()
            .initiate(&gateway, &storage, &cart())
            .await
            .unwrap();

        assert_eq!(session.checkout_url.as_str(), "https://pay.example.com/cs_123");
        assert_eq!(session.raw_checkout_url, "https://pay.example.com/cs_123");
        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].success_url,
            "https://shop.example.com/checkout/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(requests[0].cancel_url, "https://shop.example.com/cart");
    }

    #[tokio::test]
    async fn test_empty_cart_makes_no_request() {
        let gateway = FixedGateway::url("https://pay.example.com/cs_123");
        let storage = InMemoryStorage::new();
        storage.set("recently_viewed", "[1,2]").await.unwrap();

        let result = initiator()
            .initiate(&gateway, &storage, &CartSnapshot::default())
            .await;

        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert!(gateway.requests.lock().unwrap().is_empty());
        assert!(storage.get("recently_viewed").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_checkout_url_is_malformed() {
        let gateway = FixedGateway::returning(Ok(CreateSessionResponse { checkout_url: None }));
        let result = initiator()
            .initiate(&gateway, &InMemoryStorage::new(), &cart())
            .await;
        assert!(matches!(
            result,
            Err(CheckoutError::MalformedCheckoutUrl { url: None })
        ));
    }

    #[tokio::test]
    async fn test_untrusted_checkout_url_is_malformed() {
        let gateway = FixedGateway::url("https://evil.example/cs_123");
        let result = initiator()
            .initiate(&gateway, &InMemoryStorage::new(), &cart())
            .await;
        assert!(matches!(
            result,
            Err(CheckoutError::MalformedCheckoutUrl { url: Some(ref u) }) if u == "https://evil.example/cs_123"
        ));
    }

    #[tokio::test]
    async fn test_raw_checkout_url_kept_verbatim() {
        let gateway = FixedGateway::url("  https://PAY.example.com:443/cs 123\n");
        let session = initiator()
            .initiate(&gateway, &InMemoryStorage::new(), &cart())
            .await
            .unwrap();

        assert_eq!(session.raw_checkout_url, "https://PAY.example.com:443/cs 123");
        assert_eq!(
            session.checkout_url.as_str(),
            "https://pay.example.com/cs%20123"
        );
    }

    #[tokio::test]
    async fn test_http_errors_propagate() {
        let gateway = FixedGateway::returning(Err(CheckoutError::Http {
            status: 422,
            body: "{\"detail\":\"out of stock\"}".to_string(),
        }));
        let result = initiator()
            .initiate(&gateway, &InMemoryStorage::new(), &cart())
            .await;
        assert!(matches!(result, Err(CheckoutError::Http { status: 422, .. })));
    }

    #[tokio::test]
    async fn test_storage_pruned_except_auth() {
        let gateway = FixedGateway::url("https://pay.example.com/cs_123");
        let storage = InMemoryStorage::new();
        storage.set("auth_token", "secret").await.unwrap();
        storage.set("recently_viewed", "[1,2]").await.unwrap();
        storage.set("product_cache", "{}").await.unwrap();

        initiator()
            .initiate(&gateway, &storage, &cart())
            .await
            .unwrap();

        assert_eq!(storage.keys().await.unwrap(), vec!["auth_token".to_string()]);
    }
}
