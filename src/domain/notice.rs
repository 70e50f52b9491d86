use crate::error::{CheckoutError, ErrorClass};

/// What the shopper can do about a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeAction {
    /// Re-invoke checkout.
    Retry,
    /// Reload the page (expired session).
    Reload,
    /// Follow the checkout link by hand.
    OpenLink(String),
    ContactSupport,
}

/// A dismissible, human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNotice {
    pub message: String,
    pub action: NoticeAction,
    /// Technical detail, only populated when details are enabled.
    pub details: Option<String>,
}

impl UserNotice {
    pub fn from_error(error: &CheckoutError, show_details: bool) -> Self {
        let action = match (error.class(), error) {
            (_, CheckoutError::Http { status: 401, .. }) => NoticeAction::Reload,
            (ErrorClass::Transient, _) => NoticeAction::Retry,
            _ => NoticeAction::ContactSupport,
        };
        Self {
            message: error.user_message(),
            action,
            details: show_details.then(|| error.details()),
        }
    }

    pub fn redirect_blocked(checkout_url: &str) -> Self {
        Self {
            message: "We couldn't redirect you to the payment page automatically. \
                      Use the link below to continue."
                .to_string(),
            action: NoticeAction::OpenLink(checkout_url.to_string()),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_are_gated() {
        let err = CheckoutError::Http {
            status: 503,
            body: "upstream timeout".to_string(),
        };
        let hidden = UserNotice::from_error(&err, false);
        assert_eq!(hidden.details, None);
        assert_eq!(hidden.action, NoticeAction::Retry);

        let shown = UserNotice::from_error(&err, true);
        assert_eq!(shown.details.as_deref(), Some("HTTP 503: upstream timeout"));
    }

    #[test]
    fn test_actions_follow_error_class() {
        let expired = CheckoutError::Http {
            status: 401,
            body: String::new(),
        };
        assert_eq!(
            UserNotice::from_error(&expired, false).action,
            NoticeAction::Reload
        );

        let failed = CheckoutError::VerificationFailed {
            reason: "declined".to_string(),
        };
        assert_eq!(
            UserNotice::from_error(&failed, false).action,
            NoticeAction::ContactSupport
        );
    }

    #[test]
    fn test_redirect_blocked_links_raw_url() {
        let notice = UserNotice::redirect_blocked("https://pay.example.com/cs_123");
        assert_eq!(
            notice.action,
            NoticeAction::OpenLink("https://pay.example.com/cs_123".to_string())
        );
    }
}
