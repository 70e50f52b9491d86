use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckoutError>;

/// How an error is surfaced to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The flow was entered in an invalid state; the view redirects instead of
    /// showing a message.
    Precondition,
    /// Dismissible message with a retry (or reload) affordance.
    Transient,
    /// Message with a support-contact call to action; never retried.
    Terminal,
}

#[derive(Error, Diagnostic, Debug)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Missing checkout session id")]
    MissingSessionId,

    #[error("Malformed checkout URL: {}", url.as_deref().unwrap_or("<missing>"))]
    #[diagnostic(help("The payment provider returned an unexpected address. Contact support."))]
    MalformedCheckoutUrl { url: Option<String> },

    #[error("Checkout API returned HTTP {status}")]
    Http { status: u16, body: String },

    #[error("Network unavailable: {0}")]
    #[diagnostic(help("Check your connection and try again."))]
    Offline(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Payment verification failed: {reason}")]
    #[diagnostic(help("Contact support with your payment reference."))]
    VerificationFailed { reason: String },

    #[error("Payment verification still pending after {attempts} attempts")]
    #[diagnostic(help("Contact support with your payment reference."))]
    VerificationTimedOut { attempts: u32 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CheckoutError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CheckoutError::EmptyCart | CheckoutError::MissingSessionId => ErrorClass::Precondition,
            CheckoutError::Offline(_) | CheckoutError::Network(_) => ErrorClass::Transient,
            CheckoutError::Http { status, .. } => match status {
                401 | 408 | 429 | 500..=599 => ErrorClass::Transient,
                _ => ErrorClass::Terminal,
            },
            _ => ErrorClass::Terminal,
        }
    }

    /// Where the view goes instead of showing a message, for precondition errors.
    pub fn precondition_redirect(&self) -> Option<&'static str> {
        match self {
            CheckoutError::EmptyCart => Some("/cart"),
            CheckoutError::MissingSessionId => Some("/"),
            _ => None,
        }
    }

    /// Human-readable text safe to show in production. Never contains server bodies.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::EmptyCart => "Your cart is empty.".to_string(),
            CheckoutError::MissingSessionId => "No checkout session was found.".to_string(),
            CheckoutError::MalformedCheckoutUrl { .. } => {
                "We received an invalid payment page address. Please contact support.".to_string()
            }
            CheckoutError::Http { status, .. } => match status {
                400 => "Your cart or request was invalid. Please review your cart and try again."
                    .to_string(),
                401 => "Your session has expired. Please reload the page and sign in again."
                    .to_string(),
                404 => "The checkout service is currently unavailable.".to_string(),
                422 => "Some items in your cart could not be processed. Please review your cart."
                    .to_string(),
                500..=599 => "A server error occurred. Please try again later.".to_string(),
                _ => "Checkout could not be started. Please try again.".to_string(),
            },
            CheckoutError::Offline(_) => {
                "You appear to be offline. Check your connection and try again.".to_string()
            }
            CheckoutError::Network(_) => {
                "We could not reach the checkout service. Please try again.".to_string()
            }
            CheckoutError::VerificationFailed { .. } | CheckoutError::VerificationTimedOut { .. } => {
                "We could not confirm your payment. Please contact support before trying again."
                    .to_string()
            }
            _ => "Something went wrong during checkout. Please contact support.".to_string(),
        }
    }

    /// Technical detail for the "show details" disclosure.
    pub fn details(&self) -> String {
        match self {
            CheckoutError::Http { status, body } if !body.is_empty() => {
                format!("HTTP {status}: {body}")
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for CheckoutError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            CheckoutError::Offline(e.to_string())
        } else if e.is_decode() {
            CheckoutError::MalformedResponse(e.to_string())
        } else {
            CheckoutError::Network(e.to_string())
        }
    }
}

impl From<url::ParseError> for CheckoutError {
    fn from(e: url::ParseError) -> Self {
        CheckoutError::Config(format!("invalid URL: {e}"))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for CheckoutError {
    fn from(e: rocksdb::Error) -> Self {
        CheckoutError::Storage(e.to_string())
    }
}
