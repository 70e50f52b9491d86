mod common;

use common::{ScriptedGateway, cart, confirmation};
use storefront_checkout::domain::ports::{CartServiceBox, LocalStorageBox, PaymentGatewayBox};
use storefront_checkout::domain::session::SessionId;
use storefront_checkout::domain::verification::VerificationResult;
use storefront_checkout::infrastructure::in_memory::{InMemoryCartService, InMemoryStorage};

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let gateway: PaymentGatewayBox = Box::new(
        ScriptedGateway::new().with_verify(Ok(VerificationResult::Success(confirmation("A1")))),
    );
    let cart_service: CartServiceBox = Box::new(InMemoryCartService::new(cart()));
    let storage: LocalStorageBox = Box::new(InMemoryStorage::new());

    // Verify Send + Sync by spawning tasks
    let gateway_handle = tokio::spawn(async move {
        let session = SessionId::new("cs_1").unwrap();
        gateway.verify_checkout_session(&session).await.unwrap()
    });

    let cart_handle = tokio::spawn(async move {
        cart_service.clear_cart().await.unwrap();
        cart_service.fetch_cart().await.unwrap()
    });

    let storage_handle = tokio::spawn(async move {
        storage.set("auth_token", "jwt").await.unwrap();
        storage.get("auth_token").await.unwrap()
    });

    assert_eq!(
        gateway_handle.await.unwrap(),
        VerificationResult::Success(confirmation("A1"))
    );
    assert!(cart_handle.await.unwrap().is_empty());
    assert_eq!(storage_handle.await.unwrap().as_deref(), Some("jwt"));
}
