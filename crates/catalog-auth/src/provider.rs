//! Identity provider seam and session change subscriptions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

/// An authenticated session issued by the identity provider.
///
/// Replaced wholesale on every provider notification; never partially
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque access token for authenticating provider and store requests.
    pub access_token: String,
    /// The user this session belongs to.
    pub user_id: String,
    /// User email if available.
    #[serde(default)]
    pub email: Option<String>,
    /// Expiry timestamp (RFC 3339).
    pub expires_at: String,
}

/// Callback type for session change notifications.
///
/// Receives the full replacement value: `Some` for a (possibly new) session,
/// `None` for provider-reported absence.
pub type SessionChangeCallback = Box<dyn Fn(Option<Session>) + Send + Sync>;

struct RegistryInner {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<u64, SessionChangeCallback>>,
}

/// Registry of session change subscribers.
///
/// Providers own one of these and notify it after every state-changing
/// operation. Subscribers hold a [`SessionSubscription`] handle that
/// unregisters the callback when consumed.
#[derive(Clone)]
pub struct SubscriberRegistry {
    inner: Arc<RegistryInner>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                next_id: AtomicU64::new(1),
                subscribers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Register a callback, returning the subscription handle.
    pub fn subscribe(&self, callback: SessionChangeCallback) -> SessionSubscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner.subscribers.lock().unwrap().insert(id, callback);
        debug!(subscription_id = id, "session change subscription registered");
        SessionSubscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Notify every subscriber of a session replacement.
    pub fn notify(&self, next: Option<Session>) {
        let subscribers = self.inner.subscribers.lock().unwrap();
        debug!(
            count = subscribers.len(),
            present = next.is_some(),
            "notifying session change subscribers"
        );
        for callback in subscribers.values() {
            callback(next.clone());
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.inner.subscribers.lock().unwrap().len()
    }

    /// Check if there are no live subscriptions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for a registered session change subscription.
///
/// Consuming the handle with [`unsubscribe`](Self::unsubscribe) releases the
/// registration; by construction it cannot be released twice. Dropping the
/// handle without unsubscribing leaves the callback registered for the life
/// of the provider (a leak, not a crash).
pub struct SessionSubscription {
    id: u64,
    registry: Weak<RegistryInner>,
}

impl SessionSubscription {
    /// Release the subscription.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.registry.upgrade() {
            if inner.subscribers.lock().unwrap().remove(&self.id).is_some() {
                debug!(
                    subscription_id = self.id,
                    "session change subscription released"
                );
            }
        }
    }
}

/// Capability set required from the hosted identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Query the provider for the current session, if any.
    async fn current_session(&self) -> crate::AuthResult<Option<Session>>;

    /// Authenticate with email and password, yielding a new session.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> crate::AuthResult<Session>;

    /// Invalidate the current session.
    ///
    /// On failure the session must be left untouched.
    async fn sign_out(&self) -> crate::AuthResult<()>;

    /// Register a session change callback.
    fn on_session_change(&self, callback: SessionChangeCallback) -> SessionSubscription;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn session(token: &str) -> Session {
        Session {
            access_token: token.to_string(),
            user_id: "user-1".to_string(),
            email: None,
            expires_at: "2030-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn notify_reaches_all_subscribers() {
        let registry = SubscriberRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c1 = count.clone();
        let _sub1 = registry.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));
        let c2 = count.clone();
        let _sub2 = registry.subscribe(Box::new(move |_| {
            c2.fetch_add(1, Ordering::SeqCst);
        }));

        registry.notify(Some(session("t")));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribe_removes_exactly_one_registration() {
        let registry = SubscriberRegistry::new();
        let sub1 = registry.subscribe(Box::new(|_| {}));
        let _sub2 = registry.subscribe(Box::new(|_| {}));
        assert_eq!(registry.len(), 2);

        sub1.unsubscribe();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unsubscribed_callback_is_not_notified() {
        let registry = SubscriberRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        let sub = registry.subscribe(Box::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        sub.unsubscribe();

        registry.notify(None);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribe_after_registry_dropped_is_noop() {
        let registry = SubscriberRegistry::new();
        let sub = registry.subscribe(Box::new(|_| {}));
        drop(registry);
        sub.unsubscribe();
    }

    #[test]
    fn callbacks_receive_the_replacement_value() {
        let registry = SubscriberRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        let _sub = registry.subscribe(Box::new(move |next| {
            s.lock().unwrap().push(next);
        }));

        registry.notify(Some(session("a")));
        registry.notify(None);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].as_ref().unwrap().access_token, "a");
        assert!(seen[1].is_none());
    }

    #[test]
    fn clones_share_the_same_registrations() {
        let registry = SubscriberRegistry::new();
        let clone = registry.clone();

        let _sub = registry.subscribe(Box::new(|_| {}));
        assert_eq!(clone.len(), 1);
    }
}
