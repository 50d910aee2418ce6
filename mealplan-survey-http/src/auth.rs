use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use mealplan_survey_types::AuthProvider;

type ExpiredHook = Box<dyn Fn() + Send + Sync>;

/// In-memory bearer token with an optional hook for expired sessions.
#[derive(Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
    expired: AtomicBool,
    on_expired: Option<ExpiredHook>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a token, e.g. one passed on the command line.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_token(token.into());
        store
    }

    /// Run `hook` whenever the backend rejects the token.
    pub fn on_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_expired = Some(Box::new(hook));
        self
    }

    /// Whether the last token was rejected and no new one has been set since.
    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl AuthProvider for TokenStore {
    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_token(&self, token: String) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        self.expired.store(false, Ordering::SeqCst);
    }

    fn on_unauthorized(&self) {
        log::info!("Token rejected by the server, clearing it");
        self.clear();
        self.expired.store(true, Ordering::SeqCst);
        if let Some(hook) = &self.on_expired {
            hook();
        }
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_token", &self.token().is_some())
            .field("expired", &self.is_expired())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn unauthorized_clears_token_and_runs_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let store = TokenStore::with_token("abc").on_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(store.token().as_deref(), Some("abc"));

        store.on_unauthorized();
        assert_eq!(store.token(), None);
        assert!(store.is_expired());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        store.set_token("fresh".into());
        assert!(!store.is_expired());
    }

    #[test]
    fn debug_hides_token() {
        let store = TokenStore::with_token("secret");
        assert!(!format!("{store:?}").contains("secret"));
    }
}
