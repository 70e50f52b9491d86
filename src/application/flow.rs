use super::initiator::CheckoutInitiator;
use super::redirect::{RedirectState, redirect};
use super::state::{CheckoutAction, CheckoutState};
use super::verifier::{SessionVerifier, VerificationOutcome};
use crate::config::CheckoutConfig;
use crate::domain::cart::CartSnapshot;
use crate::domain::notice::UserNotice;
use crate::domain::ports::{CartServiceBox, LocalStorageBox, NavigatorBox, PaymentGatewayBox};
use crate::error::{CheckoutError, Result};
use crate::interfaces::query::session_id_from_url;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// The whole checkout journey for one browser tab.
///
/// Owns its ports and the [`CheckoutState`] the views render. At most one flow is
/// active per tab, so nothing here deduplicates concurrent calls.
pub struct CheckoutFlow {
    initiator: CheckoutInitiator,
    verifier: SessionVerifier,
    redirect_timeout: Duration,
    show_details: bool,
    gateway: PaymentGatewayBox,
    cart_service: CartServiceBox,
    storage: LocalStorageBox,
    navigator: NavigatorBox,
    state: CheckoutState,
}

impl CheckoutFlow {
    pub fn new(
        config: &CheckoutConfig,
        gateway: PaymentGatewayBox,
        cart_service: CartServiceBox,
        storage: LocalStorageBox,
        navigator: NavigatorBox,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            initiator: CheckoutInitiator::new(config)?,
            verifier: SessionVerifier::new(config.poll_interval(), config.max_poll_attempts),
            redirect_timeout: config.redirect_timeout(),
            show_details: config.show_error_details,
            gateway,
            cart_service,
            storage,
            navigator,
            state: CheckoutState::default(),
        })
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn dismiss_notice(&mut self) {
        self.state.apply(CheckoutAction::NoticeDismissed);
    }

    /// Starts checkout for `cart`. Calling it again after a failure is the retry.
    pub async fn begin_checkout(&mut self, cart: &CartSnapshot) -> &CheckoutState {
        if cart.is_empty() {
            info!("Checkout requested with an empty cart");
            self.state.apply(CheckoutAction::PreconditionRedirect("/cart"));
            return &self.state;
        }

        self.state.apply(CheckoutAction::SessionRequested);
        let session = match self
            .initiator
            .initiate(self.gateway.as_ref(), self.storage.as_ref(), cart)
            .await
        {
            Ok(session) => session,
            Err(e) => return self.fail(e),
        };

        self.state.apply(CheckoutAction::RedirectStarted {
            checkout_url: session.raw_checkout_url.clone(),
        });
        let outcome = redirect(self.navigator.as_ref(), &session, self.redirect_timeout).await;

        match outcome {
            RedirectState::AwaitingManualFallback { checkout_url } => {
                self.state
                    .apply(CheckoutAction::ManualFallback { checkout_url });
            }
            RedirectState::Succeeded(_) => self.state.apply(CheckoutAction::RedirectSucceeded),
            RedirectState::Idle | RedirectState::Attempting => {
                warn!(state = ?outcome, "Redirect ended in a non-terminal state");
                self.state.apply(CheckoutAction::ManualFallback {
                    checkout_url: session.raw_checkout_url,
                });
            }
        }
        &self.state
    }

    /// Handles the provider's return to the success callback.
    pub async fn complete_checkout(&mut self, return_url: &Url) -> &CheckoutState {
        let Some(session_id) = session_id_from_url(return_url) else {
            return self.fail(CheckoutError::MissingSessionId);
        };

        self.state.apply(CheckoutAction::VerificationStarted);
        let outcome = self
            .verifier
            .verify(
                self.gateway.as_ref(),
                self.cart_service.as_ref(),
                Some(&session_id),
            )
            .await;

        match outcome {
            Ok(VerificationOutcome::Confirmed(confirmation)) => {
                self.state.apply(CheckoutAction::OrderConfirmed(confirmation));
                &self.state
            }
            Ok(VerificationOutcome::Failed { reason }) => {
                self.fail(CheckoutError::VerificationFailed { reason })
            }
            Ok(VerificationOutcome::TimedOut { attempts }) => {
                self.fail(CheckoutError::VerificationTimedOut { attempts })
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: CheckoutError) -> &CheckoutState {
        match error.precondition_redirect() {
            Some(path) => self.state.apply(CheckoutAction::PreconditionRedirect(path)),
            None => {
                warn!(class = ?error.class(), "Checkout failed: {error}");
                self.state.apply(CheckoutAction::Failed(UserNotice::from_error(
                    &error,
                    self.show_details,
                )));
            }
        }
        &self.state
    }
}
