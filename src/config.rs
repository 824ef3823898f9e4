//! Webview configuration.
//!
//! `WebviewConfig` holds everything applied when the native window is created:
//! developer tooling, the optional parent window, and the initial title, size
//! and user agent (applied before the event loop starts).
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use gosub_webview::WebviewConfig;
//! let cfg = WebviewConfig::default();
//! assert_eq!((cfg.width, cfg.height), (800, 600));
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use gosub_webview::{SizeHint, WebviewConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = WebviewConfig::builder()
//!     .title("Basic Example")
//!     .size(480, 320, SizeHint::None)
//!     .debug(true)
//!     .build()?; // returns Result<WebviewConfig, ConfigError>
//! # Ok(()) }
//! ```
//!
//! ## Load from JSON
//! ```rust
//! use gosub_webview::WebviewConfig;
//! let cfg = WebviewConfig::from_json(r#"{ "title": "Docs", "size_hint": "fixed" }"#).unwrap();
//! assert_eq!(cfg.title, "Docs");
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`ConfigError`] for a zero width or height, an empty
//! user agent or a zero event channel capacity.

use std::fmt;
use serde::Deserialize;
use crate::handle::NativeWindowRef;
use crate::presentation::SizeHint;
use crate::DEFAULT_CHANNEL_CAPACITY;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebviewConfig {
    /// Enable developer tools (ignored where the platform has none)
    pub debug: bool,
    /// Embed into this native window instead of opening a top-level window
    #[serde(skip)]
    pub parent: Option<NativeWindowRef>,
    /// Initial window title
    pub title: String,
    /// Initial width in logical pixels
    pub width: u32,
    /// Initial height in logical pixels
    pub height: u32,
    /// Initial resize policy
    pub size_hint: SizeHint,
    /// User agent override. `None` keeps the engine's default
    pub user_agent: Option<String>,
    /// Bind the UI thread process-wide on first creation. When disabled, only the
    /// creating thread of this handle counts as its UI thread.
    pub pin_ui_thread: bool,
    /// Capacity of the host event broadcast channel
    pub event_capacity: usize,
}

impl Default for WebviewConfig {
    fn default() -> Self {
        Self {
            debug: false,
            parent: None,
            title: String::new(),
            width: 800,
            height: 600,
            size_hint: SizeHint::None,
            user_agent: None,
            pin_ui_thread: true,
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl WebviewConfig {
    pub fn builder() -> WebviewConfigBuilder {
        WebviewConfigBuilder::default()
    }

    /// Parses and validates a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: WebviewConfig = serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        validate(&cfg)?;
        Ok(cfg)
    }
}

/// Builder for [`WebviewConfig`].
#[derive(Debug, Clone, Default)]
pub struct WebviewConfigBuilder {
    inner: WebviewConfig,
}

impl WebviewConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut WebviewConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn debug(self, on: bool) -> Self { self.map(|c| c.debug = on) }
    pub fn parent(self, window: NativeWindowRef) -> Self { self.map(|c| c.parent = Some(window)) }
    pub fn title<S: Into<String>>(self, title: S) -> Self { self.map(|c| c.title = title.into()) }
    pub fn size(self, width: u32, height: u32, hint: SizeHint) -> Self {
        self.map(|c| {
            c.width = width;
            c.height = height;
            c.size_hint = hint;
        })
    }
    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = Some(ua.into())) }
    pub fn pin_ui_thread(self, on: bool) -> Self { self.map(|c| c.pin_ui_thread = on) }
    pub fn event_capacity(self, n: usize) -> Self { self.map(|c| c.event_capacity = n) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut WebviewConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<WebviewConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidSize { width: u32, height: u32 },
    EmptyUserAgent,
    ZeroEventCapacity,
    Json(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSize { width, height } =>
                write!(f, "window size {width}x{height} is invalid (both dimensions must be at least 1)"),
            ConfigError::EmptyUserAgent =>
                write!(f, "user_agent must not be empty"),
            ConfigError::ZeroEventCapacity =>
                write!(f, "event_capacity must be at least 1"),
            ConfigError::Json(msg) =>
                write!(f, "invalid JSON config: {msg}"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn validate(c: &WebviewConfig) -> Result<(), ConfigError> {
    if c.width == 0 || c.height == 0 {
        return Err(ConfigError::InvalidSize { width: c.width, height: c.height });
    }
    if matches!(c.user_agent.as_deref(), Some(ua) if ua.trim().is_empty()) {
        return Err(ConfigError::EmptyUserAgent);
    }
    if c.event_capacity == 0 {
        return Err(ConfigError::ZeroEventCapacity);
    }
    Ok(())
}
