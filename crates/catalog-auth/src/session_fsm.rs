//! Session state machine using rust-fsm.
//!
//! This module defines an explicit finite state machine for the session
//! lifecycle, replacing implicit state derivation from storage checks.
//!
//! ## State Diagram
//!
//! ```text
//! ┌─────────────────┐
//! │    SignedOut    │ (initial)
//! └────────┬────────┘
//!          │ Activate / SignInAttempt / SessionPresent
//!          ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │    Checking     │     │    SigningIn    │
//! └────────┬────────┘     └────────┬────────┘
//!          │                       │
//!          │ SessionPresent        │ SignInSucceeded / SignInFailed
//!          │ SessionAbsent         │
//!          ▼                       ▼
//! ┌─────────────────┐      SignedIn / SignedOut
//! │    SignedIn     │
//! └────────┬────────┘
//!          │ SignOutRequested
//!          ▼
//! ┌─────────────────┐
//! │   SigningOut    │ ── SignOutSucceeded ──► SignedOut
//! └─────────────────┘ ── SignOutFailed ─────► SignedIn
//! ```
//!
//! Provider notifications (`SessionPresent` / `SessionAbsent`) are accepted
//! in both steady states so that a session replaced or revoked externally
//! moves the machine without a local request in flight.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

// Define the FSM using rust-fsm's declarative macro.
// This generates a module `session_machine` with:
// - session_machine::State (enum)
// - session_machine::Input (enum)
// - session_machine::StateMachine (type alias)
state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(SignedOut)

    SignedOut => {
        Activate => Checking,
        SignInAttempt => SigningIn,
        SessionPresent => SignedIn,
        SessionAbsent => SignedOut
    },
    Checking => {
        SessionPresent => SignedIn,
        SessionAbsent => SignedOut
    },
    SigningIn => {
        SignInSucceeded => SignedIn,
        SignInFailed => SignedOut
    },
    SignedIn => {
        Activate => Checking,
        SessionPresent => SignedIn,
        SessionAbsent => SignedOut,
        SignOutRequested => SigningOut
    },
    SigningOut => {
        SignOutSucceeded => SignedOut,
        SignOutFailed => SignedIn
    }
}

// Re-export the generated types with clearer names
pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// User-friendly session state for external consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session present.
    SignedOut,
    /// Querying the identity provider for an existing session.
    Checking,
    /// Currently signing in.
    SigningIn,
    /// Signed in with a session present.
    SignedIn,
    /// Currently signing out.
    SigningOut,
}

impl SessionState {
    /// Returns true if a valid session is present (SignedIn only).
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::SignedIn)
    }

    /// Returns true if the state is a transient/in-progress state.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SessionState::Checking | SessionState::SigningIn | SessionState::SigningOut
        )
    }
}

impl From<&SessionMachineState> for SessionState {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::SignedOut => SessionState::SignedOut,
            SessionMachineState::Checking => SessionState::Checking,
            SessionMachineState::SigningIn => SessionState::SigningIn,
            SessionMachineState::SignedIn => SessionState::SignedIn,
            SessionMachineState::SigningOut => SessionState::SigningOut,
        }
    }
}
