#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storefront_checkout::config::CheckoutConfig;
use storefront_checkout::domain::cart::{CartClearOutcome, CartItem, CartSnapshot};
use storefront_checkout::domain::ports::{CartService, PaymentGateway};
use storefront_checkout::domain::session::{CreateSessionRequest, CreateSessionResponse, SessionId};
use storefront_checkout::domain::verification::{OrderConfirmation, VerificationResult};
use storefront_checkout::error::{CheckoutError, Result};

pub const CHECKOUT_URL: &str = "https://pay.example.com/cs_123";

pub fn config() -> CheckoutConfig {
    CheckoutConfig {
        site_origin: "https://shop.example.com".to_string(),
        trusted_checkout_prefix: "https://pay.example.com/".to_string(),
        ..Default::default()
    }
}

pub fn cart() -> CartSnapshot {
    CartSnapshot::new(vec![
        CartItem {
            product_id: "sku-1".to_string(),
            quantity: 2,
            unit_price: dec!(19.99),
        },
        CartItem {
            product_id: "sku-2".to_string(),
            quantity: 1,
            unit_price: dec!(5.00),
        },
    ])
}

pub fn confirmation(order_number: &str) -> OrderConfirmation {
    OrderConfirmation {
        order_id: "1001".to_string(),
        order_number: order_number.to_string(),
        email: None,
    }
}

#[derive(Default)]
struct Script {
    create: Mutex<VecDeque<Result<CreateSessionResponse>>>,
    verify: Mutex<VecDeque<Result<VerificationResult>>>,
    requests: Mutex<Vec<CreateSessionRequest>>,
    create_calls: AtomicUsize,
    verify_calls: AtomicUsize,
}

/// Gateway answering from queued responses. Verification answers `Pending` once
/// its queue is drained.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    script: Arc<Script>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_checkout_url(self, url: &str) -> Self {
        self.with_create(Ok(CreateSessionResponse {
            checkout_url: Some(url.to_string()),
        }))
    }

    pub fn with_create(self, response: Result<CreateSessionResponse>) -> Self {
        self.script.create.lock().unwrap().push_back(response);
        self
    }

    pub fn with_verify(self, result: Result<VerificationResult>) -> Self {
        self.script.verify.lock().unwrap().push_back(result);
        self
    }

    pub fn create_calls(&self) -> usize {
        self.script.create_calls.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.script.verify_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CreateSessionRequest> {
        self.script.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn create_checkout_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CreateSessionResponse> {
        self.script.create_calls.fetch_add(1, Ordering::SeqCst);
        self.script.requests.lock().unwrap().push(request.clone());
        self.script
            .create
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CheckoutError::Network("no scripted response".to_string())))
    }

    async fn verify_checkout_session(&self, _session_id: &SessionId) -> Result<VerificationResult> {
        self.script.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .verify
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(VerificationResult::Pending))
    }
}

/// Cart service whose every call fails.
#[derive(Clone, Default)]
pub struct FailingCartService {
    calls: Arc<AtomicUsize>,
}

impl FailingCartService {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CartService for FailingCartService {
    async fn clear_cart(&self) -> Result<CartClearOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CheckoutError::Http {
            status: 500,
            body: "cart backend down".to_string(),
        })
    }

    async fn fetch_cart(&self) -> Result<CartSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CheckoutError::Offline("connection refused".to_string()))
    }
}
