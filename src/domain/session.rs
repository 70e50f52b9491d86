use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Placeholder the payment provider substitutes with the real session id.
pub const SESSION_ID_TEMPLATE: &str = "{CHECKOUT_SESSION_ID}";

/// Opaque identifier of a payment session, as received on the return URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Returns `None` for blank identifiers.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /create-checkout-session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub success_url: String,
    pub cancel_url: String,
}

/// Response of `POST /create-checkout-session`. Validated before use.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CreateSessionResponse {
    #[serde(default)]
    pub checkout_url: Option<String>,
}

/// Absolute callback URLs handed to the payment provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutCallbacks {
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutCallbacks {
    /// `origin` must end with `/`.
    pub fn from_origin(origin: &Url) -> Result<Self> {
        let success = origin.join("checkout/success")?;
        let cancel = origin.join("cart")?;
        Ok(Self {
            success_url: format!("{success}?session_id={SESSION_ID_TEMPLATE}"),
            cancel_url: cancel.to_string(),
        })
    }

    pub fn to_request(&self) -> CreateSessionRequest {
        CreateSessionRequest {
            success_url: self.success_url.clone(),
            cancel_url: self.cancel_url.clone(),
        }
    }
}

/// A payment session ready to be handed to the redirect dispatcher.
///
/// `checkout_url` is what the navigator follows. `raw_checkout_url` is the trimmed
/// string the API returned, shown as-is in the manual fallback link.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub checkout_url: Url,
    pub raw_checkout_url: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// The payment provider's URL prefix.
///
/// Matching is structural: scheme, host and port must be equal and the path must
/// start with the prefix path at a segment boundary, so look-alike hosts, userinfo
/// tricks and sibling paths (`/c/payload` under `/c/pay`) are refused.
#[derive(Debug, Clone, PartialEq)]
pub struct TrustedPrefix(Url);

impl TrustedPrefix {
    pub fn new(prefix: Url) -> Self {
        Self(prefix)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn admit(&self, candidate: &str) -> Option<Url> {
        let url = Url::parse(candidate.trim()).ok()?;
        let trusted = url.scheme() == self.0.scheme()
            && url.username().is_empty()
            && url.password().is_none()
            && url.host_str() == self.0.host_str()
            && url.port_or_known_default() == self.0.port_or_known_default()
            && within_path(url.path(), self.0.path());
        trusted.then_some(url)
    }
}

fn within_path(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
