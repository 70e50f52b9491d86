use crate::domain::cart::{CartClearOutcome, CartSnapshot};
use crate::domain::ports::{CartService, LocalStorage, NavigationError, Navigator, RedirectStrategy};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use url::Url;

/// A thread-safe in-memory key/value store.
///
/// Stands in for browser local storage when nothing needs to survive the process.
#[derive(Default, Clone)]
pub struct InMemoryStorage {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStorage for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries.keys().cloned().collect())
    }
}

/// An in-memory cart that counts the requests made against it.
#[derive(Default, Clone)]
pub struct InMemoryCartService {
    cart: Arc<RwLock<CartSnapshot>>,
    clear_requests: Arc<AtomicUsize>,
    fetch_requests: Arc<AtomicUsize>,
}

impl InMemoryCartService {
    pub fn new(cart: CartSnapshot) -> Self {
        Self {
            cart: Arc::new(RwLock::new(cart)),
            ..Default::default()
        }
    }

    pub fn clear_requests(&self) -> usize {
        self.clear_requests.load(Ordering::SeqCst)
    }

    pub fn fetch_requests(&self) -> usize {
        self.fetch_requests.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> CartSnapshot {
        self.cart.read().await.clone()
    }
}

#[async_trait]
impl CartService for InMemoryCartService {
    async fn clear_cart(&self) -> Result<CartClearOutcome> {
        self.clear_requests.fetch_add(1, Ordering::SeqCst);
        let mut cart = self.cart.write().await;
        if cart.is_empty() {
            return Ok(CartClearOutcome::AlreadyEmpty);
        }
        cart.items.clear();
        Ok(CartClearOutcome::Cleared)
    }

    async fn fetch_cart(&self) -> Result<CartSnapshot> {
        self.fetch_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.cart.read().await.clone())
    }
}

#[derive(Debug, Default)]
struct HeadlessState {
    location: String,
    attempts: Vec<RedirectStrategy>,
}

/// A navigator with no browser behind it.
///
/// Strategies listed as blocked fail; the others succeed and, when `follows` is
/// set, move the current location to the target.
#[derive(Debug, Clone)]
pub struct HeadlessNavigator {
    state: Arc<Mutex<HeadlessState>>,
    blocked: HashSet<RedirectStrategy>,
    follows: bool,
}

impl HeadlessNavigator {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(HeadlessState {
                location: location.into(),
                attempts: Vec::new(),
            })),
            blocked: HashSet::new(),
            follows: true,
        }
    }

    pub fn blocking(mut self, strategy: RedirectStrategy) -> Self {
        self.blocked.insert(strategy);
        self
    }

    /// Successful calls leave the location unchanged, like a redirect an
    /// extension swallowed.
    pub fn silently_blocked(mut self) -> Self {
        self.follows = false;
        self
    }

    pub fn attempts(&self) -> Vec<RedirectStrategy> {
        self.lock().attempts.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HeadlessState> {
        // A poisoned lock only means a test thread panicked mid-update.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn navigate(
        &self,
        strategy: RedirectStrategy,
        url: &Url,
    ) -> std::result::Result<(), NavigationError> {
        let mut state = self.lock();
        state.attempts.push(strategy);
        if self.blocked.contains(&strategy) {
            return Err(NavigationError {
                strategy,
                reason: "blocked by policy".to_string(),
            });
        }
        if self.follows {
            state.location = url.to_string();
        }
        Ok(())
    }
}

impl Navigator for HeadlessNavigator {
    fn current_location(&self) -> String {
        self.lock().location.clone()
    }

    fn assign(&self, url: &Url) -> std::result::Result<(), NavigationError> {
        self.navigate(RedirectStrategy::Assign, url)
    }

    fn replace(&self, url: &Url) -> std::result::Result<(), NavigationError> {
        self.navigate(RedirectStrategy::Replace, url)
    }

    fn click_anchor(&self, url: &Url) -> std::result::Result<(), NavigationError> {
        self.navigate(RedirectStrategy::AnchorClick, url)
    }
}
