//! Authentication for Librarium.
//!
//! This crate provides:
//! - The [`Session`] value type and its persistence seam ([`SessionStore`])
//! - The [`IdentityProvider`] seam with change-notification subscriptions
//! - A Supabase/GoTrue REST client ([`GotrueClient`])
//! - Explicit FSM-based session state management ([`SessionManager`])

mod error;
mod gotrue;
mod provider;
mod session;
mod session_fsm;
mod store;

pub use error::{AuthError, AuthResult};
pub use gotrue::GotrueClient;
pub use provider::{
    IdentityProvider, Session, SessionChangeCallback, SessionSubscription, SubscriberRegistry,
};
pub use session::SessionManager;
pub use session_fsm::{
    session_machine, SessionMachine, SessionMachineInput, SessionMachineState, SessionState,
};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
