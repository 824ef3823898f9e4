//! Boundary to the native window toolkit and web engine.
//!
//! The control layer never touches toolkit internals. A platform integration
//! (GTK/WebKitGTK, Cocoa/WKWebView, Win32/WebView2, or the in-memory
//! [`HeadlessBackend`](crate::native::backends::headless::HeadlessBackend))
//! implements [`NativeBackend`] and the layer drives it from the UI thread only.
//!
//! Backends report asynchronous native happenings (page loads, user resizes,
//! the user closing the window) by posting [`NativeEvent`](crate::events::NativeEvent)s
//! through the [`EventLoopProxy`] handed to [`NativeBackend::initialize`].

use anyhow::Result;
use crate::event_loop::EventLoopProxy;
use crate::handle::NativeWindowRef;
use crate::presentation::{ContentSource, SizeHint};
use crate::script::ScriptFragment;

/// Options used when allocating the native window and engine.
#[derive(Debug, Clone, Default)]
pub struct NativeOptions {
    /// Enable developer tools where the platform supports them
    pub debug: bool,
    /// Embed into this window instead of creating a top-level window
    pub parent: Option<NativeWindowRef>,
}

/// Native window + engine behind one webview handle.
///
/// All methods are called on the UI thread. `destroy` is called exactly once.
pub trait NativeBackend {
    /// Name of the backend, for logging.
    fn name(&self) -> &str;

    /// Allocates the native window and engine. A failure here is fatal for the
    /// handle being created.
    fn initialize(&mut self, options: &NativeOptions, proxy: EventLoopProxy) -> Result<()>;

    /// The native window (or child widget when embedded).
    fn window(&self) -> Result<NativeWindowRef>;

    fn set_title(&mut self, title: &str) -> Result<()>;

    fn set_size(&mut self, width: u32, height: u32, hint: SizeHint) -> Result<()>;

    /// Replaces the displayed content. Any pending load is abandoned.
    fn load(&mut self, source: &ContentSource) -> Result<()>;

    fn set_user_agent(&mut self, user_agent: &str) -> Result<()>;

    /// Evaluates a script in the current document. The result is not reported.
    fn evaluate_script(&mut self, script: &ScriptFragment) -> Result<()>;

    /// Releases the native window and engine.
    fn destroy(&mut self);
}
