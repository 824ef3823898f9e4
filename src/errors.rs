use std::thread::ThreadId;
use crate::lifecycle::LifecycleState;

pub type Result<T, E = WebviewError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum WebviewError {
    /// The native toolkit could not create the window or engine
    #[error("Native initialization failed: {0}")]
    NativeInit(String),

    /// Operation is not allowed in the current lifecycle state
    #[error("Invalid handle state: cannot {operation} while {state}")]
    InvalidHandleState {
        operation: &'static str,
        state: LifecycleState,
    },

    /// UI-only operation called from a thread other than the UI thread
    #[error("Thread affinity violation: {operation} called from {caller:?}, UI thread is {owner:?}")]
    WrongThread {
        operation: &'static str,
        owner: ThreadId,
        caller: ThreadId,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Event loop is closed")]
    EventLoopClosed,
}

impl WebviewError {
    /// Wraps a native failure that happened after initialization.
    pub(crate) fn backend(e: anyhow::Error) -> Self {
        WebviewError::Backend(format!("{e:#}"))
    }

    /// Returns true when the error reports a contract breach by the caller
    /// (wrong state or wrong thread) rather than a native failure.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, WebviewError::InvalidHandleState { .. } | WebviewError::WrongThread { .. })
    }
}
