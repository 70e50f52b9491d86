use super::cart::{CartClearOutcome, CartSnapshot};
use super::session::{CreateSessionRequest, CreateSessionResponse, SessionId};
use super::verification::VerificationResult;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Payment-session endpoints of the storefront API.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CreateSessionResponse>;

    /// Non-2xx answers are reported as `VerificationResult::Failure`, not as errors.
    async fn verify_checkout_session(&self, session_id: &SessionId) -> Result<VerificationResult>;
}

/// The externally owned cart.
#[async_trait]
pub trait CartService: Send + Sync {
    async fn clear_cart(&self) -> Result<CartClearOutcome>;
    async fn fetch_cart(&self) -> Result<CartSnapshot>;
}

/// Browser-style key/value storage.
#[async_trait]
pub trait LocalStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn keys(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedirectStrategy {
    /// `location.assign`
    Assign,
    /// `location.replace`
    Replace,
    /// Injected anchor element, clicked and removed shortly after.
    AnchorClick,
}

impl fmt::Display for RedirectStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RedirectStrategy::Assign => "assign",
            RedirectStrategy::Replace => "replace",
            RedirectStrategy::AnchorClick => "anchor-click",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{strategy} navigation failed: {reason}")]
pub struct NavigationError {
    pub strategy: RedirectStrategy,
    pub reason: String,
}

/// Browser navigation primitives. Calls are synchronous, like their DOM counterparts.
pub trait Navigator: Send + Sync {
    fn current_location(&self) -> String;
    fn assign(&self, url: &Url) -> std::result::Result<(), NavigationError>;
    fn replace(&self, url: &Url) -> std::result::Result<(), NavigationError>;
    fn click_anchor(&self, url: &Url) -> std::result::Result<(), NavigationError>;
}

pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type CartServiceBox = Box<dyn CartService>;
pub type LocalStorageBox = Box<dyn LocalStorage>;
pub type NavigatorBox = Box<dyn Navigator>;
pub type LocalStorageFactory = Box<dyn Fn() -> LocalStorageBox + Send + Sync>;
