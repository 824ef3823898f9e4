//! Single-window webview control layer.
//!
//! Creates, drives and tears down one native window hosting a web view, and lets
//! the host inject and evaluate script in it. The native toolkit and engine sit
//! behind [`native::NativeBackend`]; this crate governs safe access to them:
//! which calls are legal in which [`LifecycleState`], which calls must come from
//! the UI thread, and how termination and script evaluation travel through the
//! event loop queue.

pub mod affinity;
pub mod config;
pub mod errors;
pub mod event_loop;
pub mod events;
pub mod handle;
pub mod lifecycle;
pub mod native;
pub mod presentation;
pub mod script;
pub mod webview;

/// Capacity of the host event broadcast channel when none is configured.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

pub use config::{ConfigError, WebviewConfig, WebviewConfigBuilder};
pub use errors::WebviewError;
pub use event_loop::EventLoopProxy;
pub use events::{NativeEvent, TerminateReason, WebviewEvent};
pub use handle::{NativeWindowRef, WebviewId, WebviewRef};
pub use lifecycle::LifecycleState;
pub use presentation::{ContentSource, SizeHint, WindowSize};
pub use script::ScriptFragment;
pub use webview::Webview;
