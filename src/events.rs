//! Webview events.
//!
//! Two kinds of events flow through this crate:
//!
//! - [`NativeEvent`]: posted by the native backend into the event loop queue
//!   (page lifecycle, user resize, user closing the window).
//! - [`WebviewEvent`]: broadcast by the webview to the host application. Subscribe
//!   with [`Webview::subscribe_events`](crate::Webview::subscribe_events). Only
//!   events sent after subscribing are received.

use std::fmt::{Display, Formatter};
use url::Url;
use crate::handle::WebviewId;
use crate::presentation::{SizeHint, WindowSize};

/// Why the event loop stopped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TerminateReason {
    /// Terminate was requested by the host (from any thread)
    Requested,
    /// The user closed the native window
    WindowClosed,
}

impl Display for TerminateReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminateReason::Requested => write!(f, "terminate requested"),
            TerminateReason::WindowClosed => write!(f, "window closed"),
        }
    }
}

/// Events posted by the native layer into the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    /// A new document started loading. Init scripts run on this event.
    DocumentStarted { url: Option<Url> },
    /// The document finished loading
    LoadFinished { url: Option<Url> },
    /// The user tries to resize the window
    ResizeRequested { width: u32, height: u32 },
    /// The user closed the window
    CloseRequested,
}

/// Events emitted to the host application.
#[derive(Debug, Clone, PartialEq)]
pub enum WebviewEvent {
    /// Event loop started pumping
    Started { webview_id: WebviewId },
    /// Title has been changed
    TitleChanged { webview_id: WebviewId, title: String },
    /// Window size or size hint changed
    Resized { webview_id: WebviewId, size: WindowSize, hint: SizeHint },
    /// Content source has been replaced (navigate or inline markup)
    ContentChanged { webview_id: WebviewId, description: String },
    /// Document finished loading, init scripts have already run
    LoadFinished { webview_id: WebviewId, url: Option<Url> },
    /// Event loop stopped
    Terminated { webview_id: WebviewId, reason: TerminateReason },
    /// Native resources have been released
    Destroyed { webview_id: WebviewId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminate_reason_display() {
        assert_eq!(TerminateReason::Requested.to_string(), "terminate requested");
        assert_eq!(TerminateReason::WindowClosed.to_string(), "window closed");
    }

    #[test]
    fn webview_event_debug() {
        let id = WebviewId::new();
        let a = WebviewEvent::Started { webview_id: id };
        let b = WebviewEvent::Terminated { webview_id: id, reason: TerminateReason::WindowClosed };

        assert!(format!("{a:?}").contains("Started"));
        assert!(format!("{b:?}").contains("WindowClosed"));
        assert_ne!(a, b);
    }
}
