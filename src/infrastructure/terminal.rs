use crate::domain::ports::{NavigationError, Navigator, RedirectStrategy};
use std::io::{self, Write};
use url::Url;

/// Navigator for the command line: prints the target instead of following it.
///
/// The location never changes, so the redirect timer always ends in the manual
/// fallback, which the console renders as a link.
#[derive(Debug, Clone)]
pub struct TerminalNavigator {
    location: String,
}

impl TerminalNavigator {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    fn announce(&self, strategy: RedirectStrategy, url: &Url) -> Result<(), NavigationError> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "Redirecting to {url}").map_err(|e| NavigationError {
            strategy,
            reason: e.to_string(),
        })
    }
}

impl Navigator for TerminalNavigator {
    fn current_location(&self) -> String {
        self.location.clone()
    }

    fn assign(&self, url: &Url) -> Result<(), NavigationError> {
        self.announce(RedirectStrategy::Assign, url)
    }

    fn replace(&self, url: &Url) -> Result<(), NavigationError> {
        self.announce(RedirectStrategy::Replace, url)
    }

    fn click_anchor(&self, url: &Url) -> Result<(), NavigationError> {
        self.announce(RedirectStrategy::AnchorClick, url)
    }
}
