//! Event loop queue and the cross-thread proxy.
//!
//! Every webview owns one queue. The UI thread drains it inside
//! [`Webview::run`](crate::Webview::run); everything else only ever writes to it
//! through an [`EventLoopProxy`]. The queue is the single serialization point
//! between threads: terminate requests, native events, eval scripts and
//! dispatched closures are all processed in the order they were posted, on the
//! UI thread.
//!
//! The queue is a tokio unbounded channel used from synchronous code. `run()`
//! blocks on it with `blocking_recv`, so it must not be called from inside an
//! async runtime.

use std::fmt::{Debug, Formatter};
use tokio::sync::mpsc;
use crate::errors::WebviewError;
use crate::events::{NativeEvent, TerminateReason};
use crate::handle::WebviewId;
use crate::script::ScriptFragment;
use crate::webview::Webview;

/// Closure that runs on the UI thread with the owning webview.
pub type DispatchFn = Box<dyn FnOnce(&mut Webview) + Send + 'static>;

pub(crate) enum LoopMessage {
    Terminate(TerminateReason),
    Native(NativeEvent),
    Eval(ScriptFragment),
    Dispatch(DispatchFn),
}

impl Debug for LoopMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopMessage::Terminate(reason) => write!(f, "Terminate({reason:?})"),
            LoopMessage::Native(ev) => write!(f, "Native({ev:?})"),
            LoopMessage::Eval(script) => write!(f, "Eval({script:?})"),
            LoopMessage::Dispatch(_) => write!(f, "Dispatch(..)"),
        }
    }
}

pub(crate) type LoopReceiver = mpsc::UnboundedReceiver<LoopMessage>;

/// Creates the queue for one webview.
pub(crate) fn channel(webview_id: WebviewId) -> (EventLoopProxy, LoopReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventLoopProxy { webview_id, tx }, rx)
}

/// Thread-safe door into a webview's event loop. Cheap to clone and `Send + Sync`.
///
/// This is the only way to interact with a webview from a thread other than its
/// UI thread.
#[derive(Clone)]
pub struct EventLoopProxy {
    webview_id: WebviewId,
    tx: mpsc::UnboundedSender<LoopMessage>,
}

impl Debug for EventLoopProxy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoopProxy")
            .field("webview_id", &self.webview_id)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl EventLoopProxy {
    pub fn webview_id(&self) -> WebviewId {
        self.webview_id
    }

    /// True once the event loop has exited or the webview has been destroyed.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Requests the event loop to exit. Safe from any thread. The request is
    /// queued, so `run()` returns once the loop reaches it. Once the loop has
    /// exited this is a no-op.
    pub fn terminate(&self) {
        if self.tx.send(LoopMessage::Terminate(TerminateReason::Requested)).is_err() {
            log::debug!("webview {}: terminate after loop exit ignored", self.webview_id);
        }
    }

    /// Runs `f` on the UI thread, with the owning webview, the next time the
    /// event loop processes its queue. Use this to marshal UI-only calls while
    /// `run()` blocks the UI thread.
    pub fn dispatch<F>(&self, f: F) -> Result<(), WebviewError>
    where
        F: FnOnce(&mut Webview) + Send + 'static,
    {
        self.post(LoopMessage::Dispatch(Box::new(f)))
    }

    /// Posts a native event. Called by backends from their toolkit callbacks.
    pub fn post_native(&self, event: NativeEvent) -> Result<(), WebviewError> {
        self.post(LoopMessage::Native(event))
    }

    pub(crate) fn post(&self, msg: LoopMessage) -> Result<(), WebviewError> {
        self.tx.send(msg).map_err(|e| {
            log::debug!("webview {}: dropping {:?}, event loop is closed", self.webview_id, e.0);
            WebviewError::EventLoopClosed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn proxy_is_send_and_sync() {
        assert_send_sync::<EventLoopProxy>();
    }

    #[test]
    fn messages_keep_posting_order() {
        let (proxy, mut rx) = channel(WebviewId::new());

        proxy.post(LoopMessage::Eval("a".into())).unwrap();
        proxy.post_native(NativeEvent::CloseRequested).unwrap();
        proxy.terminate();

        assert!(matches!(rx.try_recv(), Ok(LoopMessage::Eval(s)) if s.source() == "a"));
        assert!(matches!(rx.try_recv(), Ok(LoopMessage::Native(NativeEvent::CloseRequested))));
        assert!(matches!(rx.try_recv(), Ok(LoopMessage::Terminate(TerminateReason::Requested))));
    }

    #[test]
    fn closed_queue_rejects_dispatch_but_not_terminate() {
        let (proxy, rx) = channel(WebviewId::new());
        drop(rx);

        assert!(proxy.is_closed());
        proxy.terminate();
        assert!(matches!(proxy.dispatch(|_| {}), Err(WebviewError::EventLoopClosed)));
    }

    #[test]
    fn terminate_from_other_thread_wakes_receiver() {
        let (proxy, mut rx) = channel(WebviewId::new());
        let worker = std::thread::spawn(move || proxy.terminate());

        let msg = rx.blocking_recv();
        worker.join().unwrap();
        assert!(matches!(msg, Some(LoopMessage::Terminate(TerminateReason::Requested))));
    }
}
