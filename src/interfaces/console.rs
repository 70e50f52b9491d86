use crate::application::state::{CheckoutPhase, CheckoutState};
use crate::domain::notice::{NoticeAction, UserNotice};
use std::io::{self, Write};

/// Renders the outcome of a flow step for the terminal.
///
/// Successful outcomes go to `out`; notices go to `err`.
pub struct ConsoleRenderer<O: Write, E: Write> {
    out: O,
    err: E,
}

impl<O: Write, E: Write> ConsoleRenderer<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    /// Returns `false` when the state carries a failure.
    pub fn render(&mut self, state: &CheckoutState) -> io::Result<bool> {
        match &state.phase {
            CheckoutPhase::RedirectedLocally { path } => {
                writeln!(self.out, "Redirecting to {path}")?;
            }
            CheckoutPhase::Redirected => {
                writeln!(self.out, "Redirected to the payment provider")?;
            }
            CheckoutPhase::AwaitingManualFallback { checkout_url } => {
                writeln!(
                    self.out,
                    "Redirect did not complete. Continue to payment: {checkout_url}"
                )?;
            }
            CheckoutPhase::Confirmed => {
                if let Some(confirmation) = &state.confirmation {
                    writeln!(self.out, "Order confirmed: {}", confirmation.order_number)?;
                    if let Some(email) = &confirmation.email {
                        writeln!(self.out, "A receipt was sent to {email}")?;
                    }
                }
            }
            CheckoutPhase::Failed => {
                if let Some(notice) = &state.notice {
                    self.render_notice(notice)?;
                }
                return Ok(false);
            }
            CheckoutPhase::Idle
            | CheckoutPhase::CreatingSession
            | CheckoutPhase::Redirecting { .. }
            | CheckoutPhase::Verifying => {}
        }
        Ok(true)
    }

    fn render_notice(&mut self, notice: &UserNotice) -> io::Result<()> {
        writeln!(self.err, "Error: {}", notice.message)?;
        match &notice.action {
            NoticeAction::Retry => writeln!(self.err, "Run the command again to retry.")?,
            NoticeAction::Reload => writeln!(self.err, "Sign in again, then retry.")?,
            NoticeAction::OpenLink(url) => writeln!(self.err, "Continue manually: {url}")?,
            NoticeAction::ContactSupport => {
                writeln!(self.err, "Please contact support if the problem persists.")?
            }
        }
        if let Some(details) = &notice.details {
            writeln!(self.err, "Details: {details}")?;
        }
        Ok(())
    }
}
