//! Thread-affinity guard.
//!
//! Native toolkits want every window call to come from one thread: the UI thread.
//! [`ThreadAffinity`] records that thread when a webview is created and every
//! UI-only operation checks against it. The check runs in debug builds only; in
//! release builds a cross-thread call is passed through to the native layer as is.
//!
//! The first webview created in the process binds the UI thread for the lifetime
//! of the process (see [`bind_process_ui_thread`]), so later creations on that
//! same thread stay consistent and creations elsewhere are reported.

use std::sync::Mutex;
use std::thread::{self, ThreadId};
use lazy_static::lazy_static;
use crate::errors::WebviewError;

lazy_static! {
    static ref PROCESS_UI_THREAD: Mutex<Option<ThreadId>> = Mutex::new(None);
}

/// Binds the calling thread as the process UI thread, unless another thread has
/// already been bound. Returns the bound thread either way.
pub fn bind_process_ui_thread() -> ThreadId {
    let mut guard = PROCESS_UI_THREAD.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard.get_or_insert_with(|| {
        let id = thread::current().id();
        log::info!("binding process UI thread to {:?}", id);
        id
    })
}

/// Thread bound as the process UI thread, if any webview has been created yet.
pub fn process_ui_thread() -> Option<ThreadId> {
    *PROCESS_UI_THREAD.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Records the owning UI thread of one handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl ThreadAffinity {
    /// Affinity for a handle created on the current thread. With `pin_process`
    /// the process-wide binding is used (and established if this is the first
    /// creation), otherwise the current thread alone.
    pub fn for_creation(pin_process: bool) -> Result<Self, WebviewError> {
        let current = thread::current().id();
        let owner = if pin_process { bind_process_ui_thread() } else { current };

        let affinity = Self { owner };
        affinity.check("create")?;
        Ok(affinity)
    }

    /// Affinity bound to an explicit thread.
    pub fn bound_to(owner: ThreadId) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Fails with [`WebviewError::WrongThread`] when called off the UI thread.
    /// Compiled to a no-op in release builds.
    #[inline]
    pub fn check(&self, operation: &'static str) -> Result<(), WebviewError> {
        #[cfg(debug_assertions)]
        {
            let caller = thread::current().id();
            if caller != self.owner {
                log::error!("{operation} called from {:?} but the UI thread is {:?}", caller, self.owner);
                return Err(WebviewError::WrongThread { operation, owner: self.owner, caller });
            }
        }
        #[cfg(not(debug_assertions))]
        let _ = operation;

        Ok(())
    }
}
