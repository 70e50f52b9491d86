use crate::domain::notice::UserNotice;
use crate::domain::verification::OrderConfirmation;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    #[default]
    Idle,
    CreatingSession,
    Redirecting { checkout_url: String },
    Redirected,
    AwaitingManualFallback { checkout_url: String },
    Verifying,
    Confirmed,
    Failed,
    /// A precondition failed and the view moved to a safe local route.
    RedirectedLocally { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutAction {
    SessionRequested,
    RedirectStarted { checkout_url: String },
    RedirectSucceeded,
    ManualFallback { checkout_url: String },
    VerificationStarted,
    OrderConfirmed(OrderConfirmation),
    Failed(UserNotice),
    PreconditionRedirect(&'static str),
    NoticeDismissed,
}

/// Everything the checkout views render, changed only through [`CheckoutState::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckoutState {
    pub phase: CheckoutPhase,
    pub loading: bool,
    pub notice: Option<UserNotice>,
    pub confirmation: Option<OrderConfirmation>,
}

impl CheckoutState {
    pub fn apply(&mut self, action: CheckoutAction) {
        match action {
            CheckoutAction::SessionRequested => {
                self.phase = CheckoutPhase::CreatingSession;
                self.loading = true;
                self.notice = None;
                self.confirmation = None;
            }
            CheckoutAction::RedirectStarted { checkout_url } => {
                self.phase = CheckoutPhase::Redirecting { checkout_url };
                self.loading = true;
            }
            CheckoutAction::RedirectSucceeded => {
                self.phase = CheckoutPhase::Redirected;
                self.loading = false;
            }
            CheckoutAction::ManualFallback { checkout_url } => {
                self.notice = Some(UserNotice::redirect_blocked(&checkout_url));
                self.phase = CheckoutPhase::AwaitingManualFallback { checkout_url };
                self.loading = false;
            }
            CheckoutAction::VerificationStarted => {
                self.phase = CheckoutPhase::Verifying;
                self.loading = true;
                self.notice = None;
            }
            CheckoutAction::OrderConfirmed(confirmation) => {
                self.phase = CheckoutPhase::Confirmed;
                self.loading = false;
                self.confirmation = Some(confirmation);
            }
            CheckoutAction::Failed(notice) => {
                self.phase = CheckoutPhase::Failed;
                self.loading = false;
                self.notice = Some(notice);
            }
            CheckoutAction::PreconditionRedirect(path) => {
                self.phase = CheckoutPhase::RedirectedLocally {
                    path: path.to_string(),
                };
                self.loading = false;
                self.notice = None;
            }
            CheckoutAction::NoticeDismissed => self.notice = None,
        }
    }

    pub fn redirect_path(&self) -> Option<&str> {
        match &self.phase {
            CheckoutPhase::RedirectedLocally { path } => Some(path),
            _ => None,
        }
    }
}
