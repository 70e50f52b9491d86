use crate::domain::cart::CartClearOutcome;
use crate::domain::ports::{CartService, PaymentGateway};
use crate::domain::session::SessionId;
use crate::domain::verification::{OrderConfirmation, VerificationResult};
use crate::error::{CheckoutError, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Confirmed(OrderConfirmation),
    Failed { reason: String },
    TimedOut { attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifierState {
    Idle,
    /// `attempt` is the 1-based number of the poll in flight.
    Polling { attempt: u32 },
    Terminal(VerificationOutcome),
}

/// Result of a tick: the new state and, when polling continues, how long to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: VerifierState,
    pub delay: Option<Duration>,
}

/// Timer-free verification state machine, driven one poll result at a time.
#[derive(Debug)]
pub struct PollingMachine {
    state: VerifierState,
    interval: Duration,
    max_attempts: u32,
}

impl PollingMachine {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            state: VerifierState::Idle,
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn state(&self) -> &VerifierState {
        &self.state
    }

    /// `Idle → Polling { attempt: 1 }`. The first poll is immediate.
    pub fn start(&mut self) {
        if self.state == VerifierState::Idle {
            self.state = VerifierState::Polling { attempt: 1 };
        }
    }

    pub fn tick(&mut self, result: Result<VerificationResult>) -> Transition {
        let VerifierState::Polling { attempt } = self.state else {
            return Transition {
                state: self.state.clone(),
                delay: None,
            };
        };

        let (state, delay) = match result {
            Ok(VerificationResult::Success(confirmation)) => (
                VerifierState::Terminal(VerificationOutcome::Confirmed(confirmation)),
                None,
            ),
            Ok(VerificationResult::Pending) if attempt >= self.max_attempts => (
                VerifierState::Terminal(VerificationOutcome::TimedOut { attempts: attempt }),
                None,
            ),
            Ok(VerificationResult::Pending) => (
                VerifierState::Polling {
                    attempt: attempt + 1,
                },
                Some(self.interval),
            ),
            Ok(VerificationResult::Failure { reason }) => (
                VerifierState::Terminal(VerificationOutcome::Failed { reason }),
                None,
            ),
            Err(e) => (
                VerifierState::Terminal(VerificationOutcome::Failed {
                    reason: e.to_string(),
                }),
                None,
            ),
        };

        self.state = state.clone();
        Transition { state, delay }
    }

    pub fn outcome(&self) -> Option<&VerificationOutcome> {
        match &self.state {
            VerifierState::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Polls the verification endpoint until a terminal answer and reconciles the cart.
///
/// Dropping the future returned by [`SessionVerifier::verify`] cancels any pending
/// poll, which is how a torn-down view stops polling.
#[derive(Debug, Clone)]
pub struct SessionVerifier {
    interval: Duration,
    max_attempts: u32,
}

impl Default for SessionVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_POLL_ATTEMPTS)
    }
}

impl SessionVerifier {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    pub async fn verify(
        &self,
        gateway: &dyn PaymentGateway,
        cart: &dyn CartService,
        session_id: Option<&SessionId>,
    ) -> Result<VerificationOutcome> {
        let session_id = session_id.ok_or(CheckoutError::MissingSessionId)?;

        let mut machine = PollingMachine::new(self.interval, self.max_attempts);
        machine.start();

        loop {
            let result = gateway.verify_checkout_session(session_id).await;
            let transition = machine.tick(result);
            debug!(session = %session_id, state = ?transition.state, "Verification poll");
            match transition.delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => break,
            }
        }

        let outcome = machine
            .outcome()
            .cloned()
            .ok_or_else(|| CheckoutError::VerificationFailed {
                reason: "verification stopped before a terminal state".to_string(),
            })?;

        match &outcome {
            VerificationOutcome::Confirmed(confirmation) => {
                info!(order = %confirmation.order_number, "Payment confirmed");
                reconcile_cart(cart).await;
            }
            VerificationOutcome::Failed { reason } => {
                warn!(session = %session_id, "Payment verification failed: {reason}");
            }
            VerificationOutcome::TimedOut { attempts } => {
                warn!(session = %session_id, attempts, "Payment verification timed out");
            }
        }

        Ok(outcome)
    }
}

/// Clears the cart and refreshes it. Failures never block the confirmation.
async fn reconcile_cart(cart: &dyn CartService) {
    match cart.clear_cart().await {
        Ok(CartClearOutcome::Cleared) => debug!("Cart cleared"),
        Ok(CartClearOutcome::AlreadyEmpty) => debug!("Cart was already empty"),
        Err(e) => warn!("Could not clear cart after payment: {e}"),
    }

    if let Err(e) = cart.fetch_cart().await {
        warn!("Could not refresh cart after payment: {e}");
    }
}
