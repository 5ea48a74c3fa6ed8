//! Session management with FSM-based state tracking.
//!
//! [`SessionManager`] owns the current session for the lifetime of a
//! guarded screen. On activation it queries the identity provider once and
//! registers exactly one change subscription; every provider notification
//! replaces the owned session wholesale through a single designated replace
//! operation. Deactivation releases the subscription exactly once.

use crate::provider::{IdentityProvider, Session, SessionSubscription};
use crate::session_fsm::{SessionMachine, SessionMachineInput, SessionState};
use crate::{AuthError, AuthResult};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Shared session state: the owned value plus the FSM tracking it.
struct SessionCell {
    session: Mutex<Option<Session>>,
    fsm: Mutex<SessionMachine>,
}

impl SessionCell {
    fn new() -> Self {
        Self {
            session: Mutex::new(None),
            fsm: Mutex::new(SessionMachine::new()),
        }
    }

    /// The single designated replace operation.
    ///
    /// Swaps the owned session wholesale; old and new session data are
    /// never merged or read-modified in place.
    fn replace(&self, next: Option<Session>) {
        *self.session.lock().unwrap() = next;
    }

    /// Apply a provider notification: replace the value and move the FSM.
    ///
    /// Notifications that arrive mid-operation (e.g. the provider's own
    /// emit during sign-in) have no transition of their own; the in-flight
    /// operation finishes the move, so the input is absorbed.
    fn observe(&self, next: Option<Session>) {
        let input = if next.is_some() {
            SessionMachineInput::SessionPresent
        } else {
            SessionMachineInput::SessionAbsent
        };

        self.replace(next);

        let mut fsm = self.fsm.lock().unwrap();
        if fsm.consume(&input).is_err() {
            debug!(
                state = ?fsm.state(),
                input = ?input,
                "session notification absorbed without transition"
            );
        }
    }

    fn state(&self) -> SessionState {
        SessionState::from(self.fsm.lock().unwrap().state())
    }
}

/// Session manager gating every guarded screen.
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    cell: Arc<SessionCell>,
    subscription: Mutex<Option<SessionSubscription>>,
}

impl SessionManager {
    /// Create a new session manager over an identity provider.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            cell: Arc::new(SessionCell::new()),
            subscription: Mutex::new(None),
        }
    }

    /// Transition the FSM, erroring on an invalid move.
    fn transition(&self, input: &SessionMachineInput) -> AuthResult<SessionState> {
        let mut fsm = self.cell.fsm.lock().unwrap();
        let old_state = SessionState::from(fsm.state());

        fsm.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                fsm.state()
            ))
        })?;

        let new_state = SessionState::from(fsm.state());
        drop(fsm);

        if old_state != new_state {
            debug!(
                old_state = ?old_state,
                new_state = ?new_state,
                "Session state transition"
            );
        }

        Ok(new_state)
    }

    /// Activate the manager for a screen.
    ///
    /// Registers exactly one change subscription with the provider and
    /// queries it once for the current session. A failed query leaves the
    /// session absent (no retry), which routes the user to sign-in.
    /// Calling activate while already active is a no-op.
    pub async fn activate(&self) -> AuthResult<()> {
        {
            let mut subscription = self.subscription.lock().unwrap();
            if subscription.is_some() {
                debug!("Session manager already active");
                return Ok(());
            }
            let cell = self.cell.clone();
            *subscription = Some(
                self.provider
                    .on_session_change(Box::new(move |next| cell.observe(next))),
            );
        }

        self.transition(&SessionMachineInput::Activate)?;

        match self.provider.current_session().await {
            Ok(next) => self.cell.observe(next),
            Err(e) => {
                warn!(error = %e, "Initial session query failed, treating session as absent");
                self.cell.observe(None);
            }
        }

        Ok(())
    }

    /// Deactivate the manager, releasing the subscription.
    ///
    /// The subscription is unregistered exactly once; calling deactivate
    /// again is a no-op.
    pub fn deactivate(&self) {
        if let Some(subscription) = self.subscription.lock().unwrap().take() {
            subscription.unsubscribe();
            debug!("Session manager deactivated");
        }
    }

    /// Get the current session, if present.
    pub fn session(&self) -> Option<Session> {
        self.cell.session.lock().unwrap().clone()
    }

    /// Check if a session is present.
    pub fn is_signed_in(&self) -> bool {
        self.cell.session.lock().unwrap().is_some()
    }

    /// Get the current FSM state.
    pub fn state(&self) -> SessionState {
        self.cell.state()
    }

    /// Get the current user ID if signed in.
    pub fn user_id(&self) -> Option<String> {
        self.cell
            .session
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.user_id.clone())
    }

    /// Sign in with email and password.
    ///
    /// Drives the FSM through SigningIn:
    /// - SignedOut -> SigningIn -> (SignedIn | SignedOut)
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Session> {
        self.transition(&SessionMachineInput::SignInAttempt)?;

        match self.provider.sign_in_with_password(email, password).await {
            Ok(session) => {
                self.cell.replace(Some(session.clone()));
                self.transition(&SessionMachineInput::SignInSucceeded)?;
                info!(user_id = %session.user_id, "Sign-in complete");
                Ok(session)
            }
            Err(e) => {
                self.transition(&SessionMachineInput::SignInFailed)?;
                Err(e)
            }
        }
    }

    /// Sign out.
    ///
    /// On provider failure the session is left untouched so the user is not
    /// erroneously treated as signed out.
    pub async fn sign_out(&self) -> AuthResult<()> {
        self.transition(&SessionMachineInput::SignOutRequested)?;

        match self.provider.sign_out().await {
            Ok(()) => {
                self.cell.replace(None);
                self.transition(&SessionMachineInput::SignOutSucceeded)?;
                info!("Sign-out complete");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Sign-out failed, session left untouched");
                self.transition(&SessionMachineInput::SignOutFailed)?;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{SessionChangeCallback, SubscriberRegistry};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Scripted in-memory identity provider.
    struct MockProvider {
        session: Mutex<Option<Session>>,
        fail_current_session: AtomicBool,
        fail_sign_out: AtomicBool,
        current_session_calls: AtomicUsize,
        sign_out_calls: AtomicUsize,
        subscribers: SubscriberRegistry,
    }

    impl MockProvider {
        fn new(session: Option<Session>) -> Self {
            Self {
                session: Mutex::new(session),
                fail_current_session: AtomicBool::new(false),
                fail_sign_out: AtomicBool::new(false),
                current_session_calls: AtomicUsize::new(0),
                sign_out_calls: AtomicUsize::new(0),
                subscribers: SubscriberRegistry::new(),
            }
        }

        /// Emit a provider-side session change notification.
        fn emit(&self, next: Option<Session>) {
            *self.session.lock().unwrap() = next.clone();
            self.subscribers.notify(next);
        }

        fn subscriber_count(&self) -> usize {
            self.subscribers.len()
        }
    }

    #[async_trait]
    impl IdentityProvider for MockProvider {
        async fn current_session(&self) -> AuthResult<Option<Session>> {
            self.current_session_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_current_session.load(Ordering::SeqCst) {
                return Err(AuthError::SessionInvalid("provider unreachable".into()));
            }
            Ok(self.session.lock().unwrap().clone())
        }

        async fn sign_in_with_password(
            &self,
            email: &str,
            _password: &str,
        ) -> AuthResult<Session> {
            let session = Session {
                access_token: "fresh-token".to_string(),
                user_id: "user-1".to_string(),
                email: Some(email.to_string()),
                expires_at: "2030-01-01T00:00:00Z".to_string(),
            };
            self.emit(Some(session.clone()));
            Ok(session)
        }

        async fn sign_out(&self) -> AuthResult<()> {
            self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_sign_out.load(Ordering::SeqCst) {
                return Err(AuthError::Provider {
                    status: 500,
                    message: "sign-out rejected".to_string(),
                });
            }
            self.emit(None);
            Ok(())
        }

        fn on_session_change(&self, callback: SessionChangeCallback) -> SessionSubscription {
            self.subscribers.subscribe(callback)
        }
    }

    fn session(token: &str) -> Session {
        Session {
            access_token: token.to_string(),
            user_id: "user-1".to_string(),
            email: Some("reader@example.com".to_string()),
            expires_at: "2030-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn activate_adopts_existing_session() {
        let provider = Arc::new(MockProvider::new(Some(session("tok"))));
        let manager = SessionManager::new(provider.clone());

        manager.activate().await.unwrap();

        assert!(manager.is_signed_in());
        assert_eq!(manager.state(), SessionState::SignedIn);
        assert_eq!(manager.session().unwrap().access_token, "tok");
        assert_eq!(manager.user_id().as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn activate_without_session_stays_signed_out() {
        let provider = Arc::new(MockProvider::new(None));
        let manager = SessionManager::new(provider.clone());

        manager.activate().await.unwrap();

        assert!(!manager.is_signed_in());
        assert_eq!(manager.state(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn activate_queries_provider_exactly_once() {
        let provider = Arc::new(MockProvider::new(Some(session("tok"))));
        let manager = SessionManager::new(provider.clone());

        manager.activate().await.unwrap();

        assert_eq!(provider.current_session_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn activate_twice_keeps_a_single_subscription() {
        let provider = Arc::new(MockProvider::new(Some(session("tok"))));
        let manager = SessionManager::new(provider.clone());

        manager.activate().await.unwrap();
        manager.activate().await.unwrap();

        assert_eq!(provider.subscriber_count(), 1);
        assert_eq!(provider.current_session_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_initial_query_leaves_session_absent() {
        let provider = Arc::new(MockProvider::new(Some(session("tok"))));
        provider.fail_current_session.store(true, Ordering::SeqCst);
        let manager = SessionManager::new(provider.clone());

        // No retry: activation reports success with an absent session
        manager.activate().await.unwrap();

        assert!(!manager.is_signed_in());
        assert_eq!(manager.state(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn notification_replaces_session_wholesale() {
        let provider = Arc::new(MockProvider::new(Some(session("old"))));
        let manager = SessionManager::new(provider.clone());
        manager.activate().await.unwrap();

        provider.emit(Some(session("new")));

        assert_eq!(manager.session().unwrap().access_token, "new");
        assert_eq!(manager.state(), SessionState::SignedIn);
    }

    #[tokio::test]
    async fn notification_of_absence_signs_out() {
        let provider = Arc::new(MockProvider::new(Some(session("tok"))));
        let manager = SessionManager::new(provider.clone());
        manager.activate().await.unwrap();

        provider.emit(None);

        assert!(!manager.is_signed_in());
        assert_eq!(manager.state(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn deactivate_unsubscribes_exactly_once() {
        let provider = Arc::new(MockProvider::new(Some(session("tok"))));
        let manager = SessionManager::new(provider.clone());
        manager.activate().await.unwrap();
        assert_eq!(provider.subscriber_count(), 1);

        manager.deactivate();
        assert_eq!(provider.subscriber_count(), 0);

        // Second deactivate is a no-op
        manager.deactivate();
        assert_eq!(provider.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn notifications_after_deactivate_are_ignored() {
        let provider = Arc::new(MockProvider::new(Some(session("tok"))));
        let manager = SessionManager::new(provider.clone());
        manager.activate().await.unwrap();
        manager.deactivate();

        provider.emit(None);

        // Local state keeps the last value seen while subscribed
        assert!(manager.is_signed_in());
    }

    #[tokio::test]
    async fn sign_in_stores_the_new_session() {
        let provider = Arc::new(MockProvider::new(None));
        let manager = SessionManager::new(provider.clone());
        manager.activate().await.unwrap();

        let result = manager
            .sign_in_with_password("reader@example.com", "hunter2")
            .await
            .unwrap();

        assert_eq!(result.access_token, "fresh-token");
        assert!(manager.is_signed_in());
        assert_eq!(manager.state(), SessionState::SignedIn);
    }

    #[tokio::test]
    async fn sign_out_clears_the_session() {
        let provider = Arc::new(MockProvider::new(Some(session("tok"))));
        let manager = SessionManager::new(provider.clone());
        manager.activate().await.unwrap();

        manager.sign_out().await.unwrap();

        assert!(!manager.is_signed_in());
        assert_eq!(manager.state(), SessionState::SignedOut);
        assert_eq!(provider.sign_out_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sign_out_failure_leaves_session_untouched() {
        let provider = Arc::new(MockProvider::new(Some(session("tok"))));
        let manager = SessionManager::new(provider.clone());
        manager.activate().await.unwrap();
        provider.fail_sign_out.store(true, Ordering::SeqCst);

        let result = manager.sign_out().await;

        assert!(result.is_err());
        assert!(manager.is_signed_in());
        assert_eq!(manager.session().unwrap().access_token, "tok");
        assert_eq!(manager.state(), SessionState::SignedIn);
    }

    #[tokio::test]
    async fn sign_out_when_signed_out_is_an_invalid_transition() {
        let provider = Arc::new(MockProvider::new(None));
        let manager = SessionManager::new(provider.clone());
        manager.activate().await.unwrap();

        let result = manager.sign_out().await;

        assert!(matches!(
            result,
            Err(AuthError::InvalidStateTransition(_))
        ));
        assert_eq!(provider.sign_out_calls.load(Ordering::SeqCst), 0);
    }
}
