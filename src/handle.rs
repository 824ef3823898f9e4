//! Identifiers and reference tokens for a webview handle.
//!
//! The owning handle itself is [`Webview`](crate::Webview): one per native
//! window, never cloned. Everything in this module is a cheap, copyable token
//! that can be passed around without owning the native resource.

use std::ffi::c_void;
use std::fmt::{Debug, Display, Formatter};
use uuid::Uuid;

/// A unique identifier for a webview, represented as a UUID.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WebviewId(Uuid);

impl WebviewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WebviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for WebviewId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-owning reference to a webview. Copying it does not copy ownership of
/// the native window, and holding one does not keep the window alive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct WebviewRef {
    id: WebviewId,
}

impl WebviewRef {
    pub(crate) fn new(id: WebviewId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> WebviewId {
        self.id
    }
}

/// Opaque native window reference: a `GtkWindow*`, `NSWindow*` or `HWND`
/// depending on the platform. This layer never dereferences it.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct NativeWindowRef(usize);

impl NativeWindowRef {
    /// Wraps a raw native pointer. Returns `None` for a null pointer.
    pub fn from_raw(ptr: *mut c_void) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            Some(Self(ptr as usize))
        }
    }

    /// Builds a reference from a platform handle value (e.g. an X11 window id).
    pub fn from_handle(handle: usize) -> Option<Self> {
        (handle != 0).then_some(Self(handle))
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.0 as *mut c_void
    }

    pub fn as_handle(&self) -> usize {
        self.0
    }
}

impl Debug for NativeWindowRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeWindowRef({:#x})", self.0)
    }
}
