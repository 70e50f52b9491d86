use crate::domain::ports::{NavigationError, Navigator, RedirectStrategy};
use crate::domain::session::CheckoutSession;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_REDIRECT_TIMEOUT: Duration = Duration::from_secs(3);

type StrategyFn<'a> = Box<dyn Fn(&Url) -> Result<(), NavigationError> + Send + Sync + 'a>;

/// Ordered navigation strategies, tried until one does not fail.
pub struct RedirectPolicy<'a> {
    strategies: Vec<(RedirectStrategy, StrategyFn<'a>)>,
}

/// Result of running a policy once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The strategy did not fail. Whether the browser actually leaves is only
    /// known after the timer.
    Initiated(RedirectStrategy),
    /// Every strategy failed, in order.
    Exhausted(Vec<NavigationError>),
}

impl<'a> RedirectPolicy<'a> {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn with_strategy<F>(mut self, strategy: RedirectStrategy, attempt: F) -> Self
    where
        F: Fn(&Url) -> Result<(), NavigationError> + Send + Sync + 'a,
    {
        self.strategies.push((strategy, Box::new(attempt)));
        self
    }

    /// assign, then replace, then anchor click.
    pub fn for_navigator(navigator: &'a dyn Navigator) -> Self {
        Self::new()
            .with_strategy(RedirectStrategy::Assign, move |url| navigator.assign(url))
            .with_strategy(RedirectStrategy::Replace, move |url| navigator.replace(url))
            .with_strategy(RedirectStrategy::AnchorClick, move |url| {
                navigator.click_anchor(url)
            })
    }

    pub fn attempt(&self, url: &Url) -> AttemptOutcome {
        let mut failures = Vec::new();
        for (strategy, attempt) in &self.strategies {
            match attempt(url) {
                Ok(()) => {
                    debug!(%strategy, "Redirect initiated");
                    return AttemptOutcome::Initiated(*strategy);
                }
                Err(e) => {
                    debug!(%strategy, "Redirect strategy failed: {e}");
                    failures.push(e);
                }
            }
        }
        AttemptOutcome::Exhausted(failures)
    }
}

impl Default for RedirectPolicy<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectState {
    Idle,
    Attempting,
    Succeeded(RedirectStrategy),
    /// The raw checkout URL, shown verbatim as a manual link.
    AwaitingManualFallback { checkout_url: String },
}

/// What the caller must do after [`RedirectDispatcher::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStep {
    /// Wait, then call [`RedirectDispatcher::on_timer`].
    ArmTimer(Duration),
    /// Nothing was initiated; the fallback is already showing.
    ManualFallback,
}

#[derive(Debug)]
struct ArmedTimer {
    strategy: RedirectStrategy,
    location_at_arm: String,
    checkout_url: String,
}

/// `Idle → Attempting → (Succeeded | AwaitingManualFallback)`.
#[derive(Debug)]
pub struct RedirectDispatcher {
    state: RedirectState,
    timeout: Duration,
    armed: Option<ArmedTimer>,
}

impl RedirectDispatcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: RedirectState::Idle,
            timeout,
            armed: None,
        }
    }

    pub fn state(&self) -> &RedirectState {
        &self.state
    }

    pub fn into_state(self) -> RedirectState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Navigates to `session.checkout_url`. The fallback link is always the raw
    /// string the API returned.
    pub fn dispatch(
        &mut self,
        policy: &RedirectPolicy<'_>,
        session: &CheckoutSession,
        current_location: String,
    ) -> DispatchStep {
        self.state = RedirectState::Attempting;
        match policy.attempt(&session.checkout_url) {
            AttemptOutcome::Initiated(strategy) => {
                self.armed = Some(ArmedTimer {
                    strategy,
                    location_at_arm: current_location,
                    checkout_url: session.raw_checkout_url.clone(),
                });
                DispatchStep::ArmTimer(self.timeout)
            }
            AttemptOutcome::Exhausted(failures) => {
                warn!(
                    attempts = failures.len(),
                    "All redirect strategies failed, showing manual link"
                );
                self.state = RedirectState::AwaitingManualFallback {
                    checkout_url: session.raw_checkout_url.clone(),
                };
                DispatchStep::ManualFallback
            }
        }
    }

    /// Timer expiry. A location unchanged since arming means the redirect was
    /// silently blocked.
    pub fn on_timer(&mut self, current_location: &str) -> &RedirectState {
        let Some(armed) = self.armed.take() else {
            return &self.state;
        };

        self.state = if current_location == armed.location_at_arm {
            warn!(strategy = %armed.strategy, "Page did not navigate, showing manual link");
            RedirectState::AwaitingManualFallback {
                checkout_url: armed.checkout_url,
            }
        } else {
            info!(strategy = %armed.strategy, "Redirected to payment provider");
            RedirectState::Succeeded(armed.strategy)
        };
        &self.state
    }

    /// Teardown. A disarmed timer firing later is a no-op.
    pub fn cancel(&mut self) {
        self.armed = None;
    }
}

/// Runs the default policy against `navigator` and waits out the timer.
pub async fn redirect(
    navigator: &dyn Navigator,
    session: &CheckoutSession,
    timeout: Duration,
) -> RedirectState {
    let policy = RedirectPolicy::for_navigator(navigator);
    let mut dispatcher = RedirectDispatcher::new(timeout);

    if let DispatchStep::ArmTimer(delay) =
        dispatcher.dispatch(&policy, session, navigator.current_location())
    {
        tokio::time::sleep(delay).await;
        dispatcher.on_timer(&navigator.current_location());
    }

    dispatcher.into_state()
}
