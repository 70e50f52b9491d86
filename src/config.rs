use crate::error::{CheckoutError, Result};
use serde::Deserialize;
use std::env;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_SITE_ORIGIN: &str = "http://localhost:3000/";
pub const DEFAULT_TRUSTED_CHECKOUT_PREFIX: &str = "https://checkout.stripe.com/";

/// Runtime settings for the checkout flow.
///
/// Every field has a default so partial JSON files and sparse environments work.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Base URL of the storefront REST API.
    pub api_base_url: String,
    /// Public origin of the storefront, used to build callback URLs.
    pub site_origin: String,
    /// Prefix every checkout URL returned by the API must match.
    pub trusted_checkout_prefix: String,
    pub redirect_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub request_timeout_ms: u64,
    /// Local storage keys that survive the pre-checkout prune.
    pub preserved_storage_keys: Vec<String>,
    /// Expose technical error details. Non-production builds only.
    pub show_error_details: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            trusted_checkout_prefix: DEFAULT_TRUSTED_CHECKOUT_PREFIX.to_string(),
            redirect_timeout_ms: 3_000,
            poll_interval_ms: 2_000,
            max_poll_attempts: 30,
            request_timeout_ms: 15_000,
            preserved_storage_keys: vec![
                "auth_token".to_string(),
                "refresh_token".to_string(),
                "user".to_string(),
            ],
            show_error_details: false,
        }
    }
}

impl CheckoutConfig {
    /// Loads from a JSON file when a path is given, otherwise from `CHECKOUT_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| CheckoutError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            api_base_url: try_load("CHECKOUT_API_BASE_URL", defaults.api_base_url)?,
            site_origin: try_load("CHECKOUT_SITE_ORIGIN", defaults.site_origin)?,
            trusted_checkout_prefix: try_load(
                "CHECKOUT_TRUSTED_PREFIX",
                defaults.trusted_checkout_prefix,
            )?,
            redirect_timeout_ms: try_load(
                "CHECKOUT_REDIRECT_TIMEOUT_MS",
                defaults.redirect_timeout_ms,
            )?,
            poll_interval_ms: try_load("CHECKOUT_POLL_INTERVAL_MS", defaults.poll_interval_ms)?,
            max_poll_attempts: try_load(
                "CHECKOUT_MAX_POLL_ATTEMPTS",
                defaults.max_poll_attempts,
            )?,
            request_timeout_ms: try_load(
                "CHECKOUT_REQUEST_TIMEOUT_MS",
                defaults.request_timeout_ms,
            )?,
            preserved_storage_keys: match env::var("CHECKOUT_PRESERVED_STORAGE_KEYS") {
                Ok(keys) => keys
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect(),
                Err(_) => defaults.preserved_storage_keys,
            },
            show_error_details: try_load(
                "CHECKOUT_SHOW_ERROR_DETAILS",
                defaults.show_error_details,
            )?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.api_base()?;
        self.origin()?;
        self.trusted_prefix_url()?;
        if self.max_poll_attempts == 0 {
            return Err(CheckoutError::Config(
                "max_poll_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn api_base(&self) -> Result<Url> {
        Ok(with_trailing_slash(Url::parse(&self.api_base_url)?))
    }

    pub fn origin(&self) -> Result<Url> {
        Ok(with_trailing_slash(Url::parse(&self.site_origin)?))
    }

    pub fn trusted_prefix_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.trusted_checkout_prefix)?)
    }

    pub fn redirect_timeout(&self) -> Duration {
        Duration::from_millis(self.redirect_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Relative joins replace the last path segment unless the base ends in `/`.
pub fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn try_load<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e| {
            warn!("Invalid {key} value: {e}");
            CheckoutError::Config(format!("invalid {key} value {raw:?}: {e}"))
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
