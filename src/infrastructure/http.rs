use crate::config::CheckoutConfig;
use crate::domain::cart::{CartClearOutcome, CartSnapshot};
use crate::domain::ports::{CartService, PaymentGateway};
use crate::domain::session::{CreateSessionRequest, CreateSessionResponse, SessionId};
use crate::domain::verification::{VerificationResult, VerifyResponse};
use crate::error::{CheckoutError, Result};
use crate::interfaces::query::SESSION_ID_PARAM;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

/// Shared reqwest client bound to the storefront API base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &CheckoutConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CheckoutError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.api_base()?,
            auth_token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Maps non-2xx responses to `CheckoutError::Http`, keeping the body for details.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CheckoutError::Http {
        status: status.as_u16(),
        body,
    })
}

/// [`PaymentGateway`] over the storefront REST API.
#[derive(Clone)]
pub struct HttpPaymentGateway {
    api: ApiClient,
}

impl HttpPaymentGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CreateSessionResponse> {
        let url = self.api.endpoint("create-checkout-session")?;
        debug!(%url, "POST checkout session");
        let response = self
            .api
            .authorize(self.api.client.post(url))
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<CreateSessionResponse>().await?)
    }

    async fn verify_checkout_session(&self, session_id: &SessionId) -> Result<VerificationResult> {
        let mut url = self.api.endpoint("verify-checkout-session")?;
        url.query_pairs_mut()
            .append_pair(SESSION_ID_PARAM, session_id.as_str());

        let response = self.api.authorize(self.api.client.get(url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Verification endpoint rejected session");
            return Ok(VerificationResult::Failure {
                reason: format!("verification endpoint returned {status}"),
            });
        }
        Ok(response.json::<VerifyResponse>().await?.into())
    }
}

/// [`CartService`] over the storefront REST API.
#[derive(Clone)]
pub struct HttpCartService {
    api: ApiClient,
}

impl HttpCartService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CartService for HttpCartService {
    async fn clear_cart(&self) -> Result<CartClearOutcome> {
        let url = self.api.endpoint("cart/clear")?;
        let response = self
            .api
            .authorize(self.api.client.delete(url))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(CartClearOutcome::AlreadyEmpty);
        }
        ensure_success(response).await?;
        Ok(CartClearOutcome::Cleared)
    }

    async fn fetch_cart(&self) -> Result<CartSnapshot> {
        let url = self.api.endpoint("cart")?;
        let response = self.api.authorize(self.api.client.get(url)).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<CartSnapshot>().await?)
    }
}
