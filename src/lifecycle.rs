//! Lifecycle state machine for a webview handle.
//!
//! A handle moves through its states in one direction only:
//!
//! ```text
//! Created ──run──▶ Running ──terminate / window closed──▶ Terminated ──destroy──▶ Destroyed
//!    │                                                                              ▲
//!    └──────────────────────────────destroy (abandon)───────────────────────────────┘
//! ```
//!
//! Repeating a terminate on a terminated (or destroyed) handle, or a destroy on a
//! destroyed handle, is accepted as a no-op. Everything else that is not on the
//! diagram is rejected with [`WebviewError::InvalidHandleState`].

use std::fmt::{Display, Formatter};
use crate::errors::WebviewError;

/// Current state of the handle.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Native window and engine exist, the event loop has not started yet
    #[default]
    Created,
    /// The event loop is pumping native events
    Running,
    /// The event loop has exited (terminate request or window closed)
    Terminated,
    /// Native resources are released. The handle is invalid
    Destroyed,
}

impl Display for LifecycleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Created => write!(f, "Created"),
            LifecycleState::Running => write!(f, "Running"),
            LifecycleState::Terminated => write!(f, "Terminated"),
            LifecycleState::Destroyed => write!(f, "Destroyed"),
        }
    }
}

/// Outcome of a successful [`Lifecycle::advance`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The state moved from `from` to the requested state
    Changed { from: LifecycleState },
    /// The request was an idempotent repeat and nothing changed
    Unchanged,
}

#[derive(Debug, Default)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == LifecycleState::Destroyed
    }

    /// Move to `to`, or fail when the transition is not legal. `operation` names
    /// the caller-facing operation for the error message.
    pub fn advance(&mut self, to: LifecycleState, operation: &'static str) -> Result<Transition, WebviewError> {
        use LifecycleState::*;

        let from = self.state;
        match (from, to) {
            (Created, Running) | (Running, Terminated) | (Terminated, Destroyed) | (Created, Destroyed) => {
                self.state = to;
                log::debug!("lifecycle: {from} -> {to}");
                Ok(Transition::Changed { from })
            }
            (Terminated, Terminated) | (Destroyed, Terminated) | (Destroyed, Destroyed) => Ok(Transition::Unchanged),
            _ => Err(WebviewError::InvalidHandleState { operation, state: from }),
        }
    }

    /// Fails unless the handle is in one of the `allowed` states.
    pub fn require(&self, allowed: &[LifecycleState], operation: &'static str) -> Result<(), WebviewError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(WebviewError::InvalidHandleState { operation, state: self.state })
        }
    }
}
