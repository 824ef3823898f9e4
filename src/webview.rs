//! The owning webview handle.
//!
//! A [`Webview`] owns one native window + engine. It is created on the UI
//! thread, configured, then driven by [`Webview::run`], which blocks until the
//! loop is terminated (by [`EventLoopProxy::terminate`] from any thread, or by
//! the user closing the window). [`Webview::destroy`] then releases the native
//! resources. Dropping a webview that was not destroyed destroys it, unless it
//! is dropped off its UI thread: then the native resources are leaked.
//!
//! ```
//! use gosub_webview::{Webview, WebviewConfig, SizeHint};
//! use gosub_webview::native::backends::headless::HeadlessBackend;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WebviewConfig::builder()
//!     .title("Basic Example")
//!     .size(480, 320, SizeHint::None)
//!     .pin_ui_thread(false)
//!     .build()?;
//!
//! let mut webview = Webview::create(config, Box::new(HeadlessBackend::new()))?;
//! webview.init("window.ready = true")?;
//! webview.set_html("Thanks for using webview!")?;
//!
//! // Stop the loop once it has processed the page load
//! webview.proxy().dispatch(|wv| wv.terminate())?;
//! webview.run()?;
//! webview.destroy()?;
//! # Ok(()) }
//! ```

use std::fmt::{Debug, Formatter};
use tokio::sync::broadcast;
use url::Url;
use crate::affinity::ThreadAffinity;
use crate::config::WebviewConfig;
use crate::errors::{Result, WebviewError};
use crate::event_loop::{self, EventLoopProxy, LoopMessage, LoopReceiver};
use crate::events::{NativeEvent, TerminateReason, WebviewEvent};
use crate::handle::{NativeWindowRef, WebviewId, WebviewRef};
use crate::lifecycle::{Lifecycle, LifecycleState, Transition};
use crate::native::{NativeBackend, NativeOptions};
use crate::presentation::{ContentSource, Presentation, SizeHint, WindowSize};
use crate::script::{self, ScriptBridge, ScriptFragment, ScriptKind};

use LifecycleState::{Created, Destroyed, Running, Terminated};

/// States in which presentation and init scripts may be changed.
const CONFIGURABLE: &[LifecycleState] = &[Created, Running];

pub struct Webview {
    /// ID of the webview
    id: WebviewId,
    /// Where in its lifecycle the handle is
    lifecycle: Lifecycle,
    /// UI thread this handle belongs to
    affinity: ThreadAffinity,
    /// What has been applied to the native window
    presentation: Presentation,
    /// Persistent init scripts
    scripts: ScriptBridge,
    /// Native window and engine
    backend: Box<dyn NativeBackend + Send>,
    /// Sender side of our own event loop queue
    proxy: EventLoopProxy,
    /// Receiver side of the queue. Taken by `run()` and closed when the loop
    /// exits, which makes every proxy refuse further posts.
    queue: Option<LoopReceiver>,
    /// Host event bus
    event_tx: broadcast::Sender<WebviewEvent>,
}

impl Debug for Webview {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Webview")
            .field("id", &self.id)
            .field("state", &self.lifecycle.state())
            .field("ui_thread", &self.affinity.owner())
            .field("backend", &self.backend.name())
            .field("presentation", &self.presentation)
            .finish()
    }
}

impl Webview {
    /// Creates the native window and engine. Must be called on the UI thread.
    ///
    /// The configured title, size and user agent are applied right away. The
    /// returned handle is in the [`Created`](LifecycleState::Created) state.
    pub fn create(config: WebviewConfig, mut backend: Box<dyn NativeBackend + Send>) -> Result<Self> {
        let affinity = ThreadAffinity::for_creation(config.pin_ui_thread)?;
        let id = WebviewId::new();
        let (proxy, queue) = event_loop::channel(id);
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));

        let options = NativeOptions { debug: config.debug, parent: config.parent };
        backend.initialize(&options, proxy.clone()).map_err(|e| {
            log::error!("webview {id}: {} failed to initialize: {e:#}", backend.name());
            WebviewError::NativeInit(format!("{e:#}"))
        })?;

        log::info!(
            "webview {id}: created on {} (debug: {}, parent: {:?})",
            backend.name(),
            options.debug,
            options.parent
        );

        let mut webview = Self {
            id,
            lifecycle: Lifecycle::new(),
            affinity,
            presentation: Presentation::new(),
            scripts: ScriptBridge::new(),
            backend,
            proxy,
            queue: Some(queue),
            event_tx,
        };

        if !config.title.is_empty() {
            webview.set_title(&config.title)?;
        }
        webview.set_size(config.width, config.height, config.size_hint)?;
        if let Some(user_agent) = &config.user_agent {
            webview.set_user_agent(user_agent)?;
        }

        Ok(webview)
    }

    /// Creates a top-level window with the default configuration.
    pub fn new(debug: bool, backend: Box<dyn NativeBackend + Send>) -> Result<Self> {
        Self::create(WebviewConfig { debug, ..WebviewConfig::default() }, backend)
    }

    pub fn id(&self) -> WebviewId {
        self.id
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Non-owning token for this webview.
    pub fn reference(&self) -> WebviewRef {
        WebviewRef::new(self.id)
    }

    /// Cross-thread proxy into this webview's event loop.
    pub fn proxy(&self) -> EventLoopProxy {
        self.proxy.clone()
    }

    /// Subscribe to host events. Only events sent after this call are received.
    pub fn subscribe_events(&self) -> broadcast::Receiver<WebviewEvent> {
        self.event_tx.subscribe()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Runs the event loop until it is terminated. Blocks the calling thread.
    ///
    /// Only valid on a freshly created handle: the loop cannot be restarted and
    /// calling `run` from inside the loop (a dispatched closure) fails. Must not
    /// be called from within an async runtime.
    pub fn run(&mut self) -> Result<()> {
        self.affinity.check("run")?;
        self.lifecycle.advance(Running, "run")?;

        let Some(mut queue) = self.queue.take() else {
            return Err(self.queue_lost());
        };

        log::info!("webview {}: event loop started", self.id);
        self.emit(WebviewEvent::Started { webview_id: self.id });

        // `self.proxy` keeps a sender alive, so the queue never runs dry here
        while self.lifecycle.state() == Running {
            let Some(msg) = queue.blocking_recv() else {
                return Err(self.queue_lost());
            };
            self.handle_message(msg);
        }

        // The loop cannot be restarted: later posts must fail instead of
        // queueing work that never runs.
        queue.close();
        while let Ok(msg) = queue.try_recv() {
            log::debug!("webview {}: discarding {:?} posted after terminate", self.id, msg);
        }
        log::info!("webview {}: event loop exited", self.id);
        Ok(())
    }

    /// Requests the event loop to exit. The request goes through the loop queue,
    /// exactly like [`EventLoopProxy::terminate`] from another thread. A no-op
    /// once the handle is terminated or destroyed.
    pub fn terminate(&self) {
        match self.lifecycle.state() {
            Terminated | Destroyed => log::debug!("webview {}: already terminated", self.id),
            Created | Running => self.proxy.terminate(),
        }
    }

    /// Releases the native window and engine. Valid before `run` (abandon) or
    /// after the loop has terminated. Destroying twice is a no-op.
    pub fn destroy(&mut self) -> Result<()> {
        self.affinity.check("destroy")?;
        if let Transition::Changed { .. } = self.lifecycle.advance(Destroyed, "destroy")? {
            self.release();
        }
        Ok(())
    }

    /// Native window handle, for embedding or platform specific calls.
    pub fn native_window(&self) -> Result<NativeWindowRef> {
        self.affinity.check("native_window")?;
        self.lifecycle.require(&[Created, Running, Terminated], "native_window")?;
        self.backend.window().map_err(WebviewError::backend)
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.guard_ui("set_title", CONFIGURABLE)?;
        self.backend.set_title(title).map_err(WebviewError::backend)?;
        self.presentation.set_title(title);
        self.emit(WebviewEvent::TitleChanged { webview_id: self.id, title: title.to_string() });
        Ok(())
    }

    /// Sets the window size and how the user may resize it. The hint replaces
    /// any previous hint.
    pub fn set_size(&mut self, width: u32, height: u32, hint: SizeHint) -> Result<()> {
        self.guard_ui("set_size", CONFIGURABLE)?;
        self.backend.set_size(width, height, hint).map_err(WebviewError::backend)?;
        let size = self.presentation.set_size(width, height, hint);
        self.emit(WebviewEvent::Resized { webview_id: self.id, size, hint });
        Ok(())
    }

    /// Navigates to `url`. Properly encoded `data:` URIs are accepted.
    pub fn navigate(&mut self, url: &str) -> Result<()> {
        self.guard_ui("navigate", CONFIGURABLE)?;
        let parsed = Url::parse(url).map_err(|e| WebviewError::InvalidUrl(format!("{url}: {e}")))?;
        self.load(ContentSource::Url(parsed))
    }

    /// Displays `markup` directly. Replaces whatever was navigated to before.
    pub fn set_html(&mut self, markup: &str) -> Result<()> {
        self.guard_ui("set_html", CONFIGURABLE)?;
        self.load(ContentSource::InlineMarkup(markup.to_string()))
    }

    pub fn set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        self.guard_ui("set_user_agent", CONFIGURABLE)?;
        self.backend.set_user_agent(user_agent).map_err(WebviewError::backend)?;
        self.presentation.set_user_agent(user_agent);
        Ok(())
    }

    /// Registers a script that runs at the start of every document, before the
    /// page finishes loading. Scripts run in registration order.
    pub fn init(&mut self, script: impl Into<ScriptFragment>) -> Result<()> {
        self.guard_ui("init", CONFIGURABLE)?;
        self.scripts.register_init(script.into());
        Ok(())
    }

    /// Schedules `script` for evaluation in the current document and returns
    /// immediately. The result, or any error thrown, is discarded.
    ///
    /// A script posted while a navigation is in flight may run against either
    /// document, or not at all, depending on the native engine.
    pub fn eval(&mut self, script: impl Into<ScriptFragment>) -> Result<()> {
        self.guard_ui("eval", &[Running])?;
        self.proxy.post(LoopMessage::Eval(script.into()))
    }

    pub fn title(&self) -> &str {
        self.presentation.title()
    }

    pub fn size(&self) -> WindowSize {
        self.presentation.size()
    }

    pub fn size_hint(&self) -> SizeHint {
        self.presentation.hint()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.presentation.user_agent()
    }

    /// Content source applied last, if any.
    pub fn content(&self) -> Option<&ContentSource> {
        self.presentation.content()
    }

    pub fn init_scripts(&self) -> &[ScriptFragment] {
        self.scripts.init_scripts()
    }

    fn guard_ui(&self, operation: &'static str, allowed: &[LifecycleState]) -> Result<()> {
        self.affinity.check(operation)?;
        self.lifecycle.require(allowed, operation)
    }

    fn load(&mut self, source: ContentSource) -> Result<()> {
        self.backend.load(&source).map_err(WebviewError::backend)?;
        log::debug!("webview {}: loading {}", self.id, source);
        self.emit(WebviewEvent::ContentChanged { webview_id: self.id, description: source.to_string() });
        self.presentation.set_content(source);
        Ok(())
    }

    fn handle_message(&mut self, msg: LoopMessage) {
        log::trace!("webview {}: {:?}", self.id, msg);
        match msg {
            LoopMessage::Terminate(reason) => self.mark_terminated(reason),
            LoopMessage::Native(event) => self.handle_native_event(event),
            LoopMessage::Eval(script) => script::run_script(self.backend.as_mut(), ScriptKind::Eval, &script),
            LoopMessage::Dispatch(f) => f(self),
        }
    }

    fn handle_native_event(&mut self, event: NativeEvent) {
        match event {
            NativeEvent::DocumentStarted { url } => {
                let count = self.scripts.apply_init(self.backend.as_mut());
                log::debug!("webview {}: document started ({:?}), ran {count} init script(s)", self.id, url);
            }
            NativeEvent::LoadFinished { url } => {
                self.emit(WebviewEvent::LoadFinished { webview_id: self.id, url });
            }
            NativeEvent::ResizeRequested { width, height } => {
                match self.presentation.user_resize(WindowSize::new(width, height)) {
                    Some(size) => self.emit(WebviewEvent::Resized {
                        webview_id: self.id,
                        size,
                        hint: self.presentation.hint(),
                    }),
                    None => log::debug!(
                        "webview {}: resize to {width}x{height} kept at {:?} by {:?} hint",
                        self.id,
                        self.presentation.size(),
                        self.presentation.hint()
                    ),
                }
            }
            NativeEvent::CloseRequested => self.mark_terminated(TerminateReason::WindowClosed),
        }
    }

    fn mark_terminated(&mut self, reason: TerminateReason) {
        match self.lifecycle.advance(Terminated, "terminate") {
            Ok(Transition::Changed { .. }) => {
                log::info!("webview {}: terminated ({reason})", self.id);
                self.emit(WebviewEvent::Terminated { webview_id: self.id, reason });
            }
            Ok(Transition::Unchanged) => {}
            Err(e) => log::warn!("webview {}: {e}", self.id),
        }
    }

    /// The loop lost its queue, which cannot happen while `self.proxy` holds a
    /// sender. Stops without emitting `Terminated`, there is no reason to report.
    fn queue_lost(&mut self) -> WebviewError {
        log::error!("webview {}: event loop queue closed unexpectedly", self.id);
        let _ = self.lifecycle.advance(Terminated, "run");
        WebviewError::EventLoopClosed
    }

    fn release(&mut self) {
        self.backend.destroy();
        self.queue = None;
        log::info!("webview {}: destroyed", self.id);
        self.emit(WebviewEvent::Destroyed { webview_id: self.id });
    }

    fn emit(&self, event: WebviewEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

impl Drop for Webview {
    fn drop(&mut self) {
        if self.lifecycle.is_destroyed() {
            return;
        }
        if !self.affinity.is_owner_thread() {
            // Native teardown is UI-thread only, leak it instead
            log::error!(
                "webview {}: dropped off its UI thread {:?}, native resources are leaked",
                self.id,
                self.affinity.owner()
            );
            return;
        }
        if self.lifecycle.state() == Running {
            let _ = self.lifecycle.advance(Terminated, "drop");
        }
        if self.lifecycle.advance(Destroyed, "drop").is_ok() {
            self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::{Duration, Instant};
    use super::*;
    use crate::config::WebviewConfigBuilder;
    use crate::native::backends::headless::{HeadlessBackend, HeadlessProbe};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Unit tests run on many threads, so they never pin the process UI thread.
    fn config() -> WebviewConfigBuilder {
        WebviewConfig::builder().pin_ui_thread(false)
    }

    fn headless(builder: WebviewConfigBuilder) -> (Webview, HeadlessProbe) {
        init_logging();
        let backend = HeadlessBackend::new();
        let probe = backend.probe();
        let webview = Webview::create(builder.build().unwrap(), Box::new(backend)).unwrap();
        (webview, probe)
    }

    fn drain(rx: &mut broadcast::Receiver<WebviewEvent>) -> Vec<WebviewEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn stop_after_queued(webview: &Webview) {
        webview.proxy().dispatch(|wv| wv.terminate()).unwrap();
    }

    #[test]
    fn webview_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Webview>();
    }

    #[test]
    fn create_applies_initial_presentation() {
        let parent = NativeWindowRef::from_handle(0x42).unwrap();
        let (webview, probe) = headless(
            config()
                .title("Basic Example")
                .size(480, 320, SizeHint::Fixed)
                .user_agent("Gosub/1.0")
                .debug(true)
                .parent(parent),
        );

        assert_eq!(webview.state(), Created);
        assert_eq!(webview.title(), "Basic Example");
        assert_eq!(webview.size(), WindowSize::new(480, 320));
        assert_eq!(webview.user_agent(), Some("Gosub/1.0"));

        assert_eq!(probe.title(), "Basic Example");
        assert_eq!(probe.size(), Some((480, 320, SizeHint::Fixed)));
        assert_eq!(probe.user_agent().as_deref(), Some("Gosub/1.0"));
        assert!(probe.debug_enabled());
        assert_eq!(probe.parent(), Some(parent));
        assert!(webview.native_window().is_ok());
    }

    #[test]
    fn native_init_failure_is_a_construction_error() {
        init_logging();
        let cfg = config().build().unwrap();
        match Webview::create(cfg, Box::new(HeadlessBackend::failing("no display"))) {
            Err(WebviewError::NativeInit(msg)) => assert!(msg.contains("no display")),
            other => panic!("expected NativeInit, got {:?}", other),
        }
    }

    #[test]
    fn terminate_before_run_makes_run_return() {
        let (mut webview, _probe) = headless(config());
        let mut events = webview.subscribe_events();

        webview.terminate();
        webview.run().unwrap();

        assert_eq!(webview.state(), Terminated);
        let events = drain(&mut events);
        assert_eq!(
            events,
            vec![
                WebviewEvent::Started { webview_id: webview.id() },
                WebviewEvent::Terminated { webview_id: webview.id(), reason: TerminateReason::Requested },
            ]
        );
    }

    #[test]
    fn init_scripts_run_in_order_on_every_load() {
        let (mut webview, probe) = headless(config());
        let mut events = webview.subscribe_events();

        webview.init("A").unwrap();
        webview.init("B").unwrap();
        webview.navigate("about:blank").unwrap();
        webview.set_html("<h1>x</h1>").unwrap();
        probe.reload().unwrap();
        stop_after_queued(&webview);

        webview.run().unwrap();

        assert_eq!(probe.executed_scripts(), vec!["A", "B", "A", "B", "A", "B"]);
        assert_eq!(webview.content(), Some(&ContentSource::InlineMarkup("<h1>x</h1>".into())));
        assert_eq!(probe.load_count(), 2);

        let loads = drain(&mut events)
            .into_iter()
            .filter(|ev| matches!(ev, WebviewEvent::LoadFinished { .. }))
            .count();
        assert_eq!(loads, 3);
    }

    #[test]
    fn init_registered_while_running_applies_from_next_load() {
        let (mut webview, probe) = headless(config());
        webview.init("A").unwrap();
        webview.set_html("first").unwrap();

        webview
            .proxy()
            .dispatch(|wv| {
                wv.init("B").unwrap();
                wv.set_html("second").unwrap();
                wv.terminate();
            })
            .unwrap();
        webview.run().unwrap();

        assert_eq!(probe.executed_scripts(), vec!["A", "A", "B"]);
    }

    #[test]
    fn navigate_then_set_html_keeps_markup() {
        let (mut webview, probe) = headless(config());
        webview.navigate("about:blank").unwrap();
        webview.set_html("<h1>x</h1>").unwrap();

        assert!(matches!(webview.content(), Some(ContentSource::InlineMarkup(_))));
        assert_eq!(probe.content(), Some(ContentSource::InlineMarkup("<h1>x</h1>".into())));

        webview.navigate("data:text/html,%3Ch1%3EHello%3C%2Fh1%3E").unwrap();
        assert!(matches!(webview.content(), Some(ContentSource::Url(u)) if u.scheme() == "data"));
    }

    #[test]
    fn invalid_url_is_rejected_and_content_kept() {
        let (mut webview, probe) = headless(config());
        webview.set_html("kept").unwrap();

        assert!(matches!(webview.navigate("not a url"), Err(WebviewError::InvalidUrl(_))));
        assert_eq!(webview.content(), Some(&ContentSource::InlineMarkup("kept".into())));
        assert_eq!(probe.load_count(), 1);
    }

    #[test]
    fn eval_needs_a_running_loop() {
        let (mut webview, _probe) = headless(config());
        match webview.eval("1 + 1") {
            Err(WebviewError::InvalidHandleState { operation: "eval", state: Created }) => {}
            other => panic!("expected InvalidHandleState, got {:?}", other),
        }
    }

    #[test]
    fn eval_runs_asynchronously_and_swallows_errors() {
        let (mut webview, probe) = headless(config());
        probe.fail_scripts_containing("throw");

        let (tx, rx) = mpsc::channel();
        let inner_probe = probe.clone();
        webview
            .proxy()
            .dispatch(move |wv| {
                wv.eval("throw new Error('boom')").unwrap();
                wv.eval("document.title = 'hi'").unwrap();
                // eval only queues, nothing has run yet
                tx.send(inner_probe.executed_scripts().len()).unwrap();
                wv.terminate();
            })
            .unwrap();

        webview.run().unwrap();

        assert_eq!(rx.recv().unwrap(), 0);
        assert_eq!(probe.executed_scripts(), vec!["document.title = 'hi'"]);
        assert_eq!(webview.state(), Terminated);
    }

    #[test]
    fn terminate_from_other_thread_unblocks_run() {
        let (mut webview, _probe) = headless(config());
        let proxy = webview.proxy();
        let ui_thread = thread::current().id();

        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            proxy
                .dispatch(move |_wv| {
                    tx.send(thread::current().id()).unwrap();
                })
                .unwrap();
            proxy.terminate();
            thread::current().id()
        });

        let started = Instant::now();
        webview.run().unwrap();
        let worker_thread = worker.join().unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(webview.state(), Terminated);
        // The dispatched closure ran on the UI thread, not on the worker
        assert_eq!(rx.recv().unwrap(), ui_thread);
        assert_ne!(worker_thread, ui_thread);
    }

    #[test]
    fn closing_the_window_terminates() {
        let (mut webview, probe) = headless(config());
        let mut events = webview.subscribe_events();

        probe.close_window().unwrap();
        webview.run().unwrap();

        assert_eq!(webview.state(), Terminated);
        assert!(drain(&mut events).contains(&WebviewEvent::Terminated {
            webview_id: webview.id(),
            reason: TerminateReason::WindowClosed,
        }));
    }

    #[test]
    fn fixed_hint_ignores_user_resize() {
        let (mut webview, probe) = headless(config().size(480, 320, SizeHint::Fixed));

        probe.resize_window(1024, 768).unwrap();
        stop_after_queued(&webview);
        webview.run().unwrap();

        assert_eq!(webview.size(), WindowSize::new(480, 320));
    }

    #[test]
    fn free_hint_follows_user_resize() {
        let (mut webview, probe) = headless(config().size(480, 320, SizeHint::None));
        let mut events = webview.subscribe_events();

        probe.resize_window(1024, 768).unwrap();
        stop_after_queued(&webview);
        webview.run().unwrap();

        assert_eq!(webview.size(), WindowSize::new(1024, 768));
        assert!(drain(&mut events).contains(&WebviewEvent::Resized {
            webview_id: webview.id(),
            size: WindowSize::new(1024, 768),
            hint: SizeHint::None,
        }));
    }

    #[test]
    fn run_and_destroy_are_rejected_inside_the_loop() {
        let (mut webview, _probe) = headless(config());

        let (tx, rx) = mpsc::channel();
        webview
            .proxy()
            .dispatch(move |wv| {
                let rerun = wv.run();
                let destroy = wv.destroy();
                tx.send((rerun.is_err(), destroy.is_err(), wv.state())).unwrap();
                wv.terminate();
            })
            .unwrap();

        webview.run().unwrap();
        assert_eq!(rx.recv().unwrap(), (true, true, Running));
        assert!(webview.run().is_err());
    }

    #[test]
    fn repeated_terminate_and_destroy_are_noops() {
        let (mut webview, probe) = headless(config());
        let proxy = webview.proxy();

        webview.terminate();
        webview.terminate();
        webview.run().unwrap();
        webview.terminate();
        proxy.terminate();
        assert_eq!(webview.state(), Terminated);

        webview.destroy().unwrap();
        webview.destroy().unwrap();
        webview.terminate();
        assert_eq!(webview.state(), Destroyed);
        assert_eq!(probe.destroy_count(), 1);
    }

    #[test]
    fn nothing_else_succeeds_after_destroy() {
        let (mut webview, probe) = headless(config());
        let proxy = webview.proxy();
        webview.terminate();
        webview.run().unwrap();
        webview.destroy().unwrap();

        let is_invalid = |r: Result<()>| matches!(r, Err(WebviewError::InvalidHandleState { state: Destroyed, .. }));
        assert!(is_invalid(webview.run()));
        assert!(is_invalid(webview.set_title("x")));
        assert!(is_invalid(webview.set_size(1, 1, SizeHint::None)));
        assert!(is_invalid(webview.navigate("about:blank")));
        assert!(is_invalid(webview.set_html("x")));
        assert!(is_invalid(webview.set_user_agent("x")));
        assert!(is_invalid(webview.init("x")));
        assert!(is_invalid(webview.eval("x")));
        assert!(webview.native_window().is_err());

        assert!(proxy.is_closed());
        assert!(matches!(proxy.dispatch(|_| {}), Err(WebviewError::EventLoopClosed)));
        assert!(probe.close_window().is_err());
    }

    #[test]
    fn posts_after_the_loop_exits_are_refused() {
        let (mut webview, probe) = headless(config());
        let proxy = webview.proxy();
        webview.terminate();
        webview.run().unwrap();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let result = proxy.dispatch(move |_| flag.store(true, Ordering::SeqCst));
        assert!(matches!(result, Err(WebviewError::EventLoopClosed)), "got {:?}", result);
        assert!(proxy.is_closed());
        assert!(probe.close_window().is_err());
        proxy.terminate();

        webview.destroy().unwrap();
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn presentation_is_rejected_after_termination() {
        let (mut webview, _probe) = headless(config());
        webview.terminate();
        webview.run().unwrap();

        assert!(webview.set_title("late").is_err());
        assert!(webview.native_window().is_ok());
    }

    #[test]
    fn abandon_before_run_releases_once() {
        let (mut webview, probe) = headless(config());
        let mut events = webview.subscribe_events();

        webview.destroy().unwrap();
        assert_eq!(webview.state(), Destroyed);
        assert_eq!(probe.destroy_count(), 1);
        assert_eq!(drain(&mut events), vec![WebviewEvent::Destroyed { webview_id: webview.id() }]);

        drop(webview);
        assert_eq!(probe.destroy_count(), 1);
    }

    #[test]
    fn drop_destroys_native_resources() {
        let (webview, probe) = headless(config());
        let proxy = webview.proxy();
        drop(webview);

        assert_eq!(probe.destroy_count(), 1);
        assert!(proxy.is_closed());
    }

    #[test]
    fn dropping_off_the_ui_thread_leaks_native_resources() {
        let (webview, probe) = headless(config());
        let proxy = webview.proxy();

        thread::spawn(move || drop(webview)).join().unwrap();

        assert_eq!(probe.destroy_count(), 0);
        assert!(proxy.is_closed());
    }

    #[test]
    fn reference_tokens_are_copies_of_the_id() {
        let (webview, _probe) = headless(config());
        let a = webview.reference();
        let b = a;
        assert_eq!(a.id(), webview.id());
        assert_eq!(b, a);
        assert_eq!(webview.proxy().webview_id(), webview.id());
    }

    #[cfg(debug_assertions)]
    #[test]
    fn ui_calls_from_another_thread_fail_loudly() {
        let (webview, probe) = headless(config());

        let (mut webview, results) = thread::spawn(move || {
            let mut wv = webview;
            let results = vec![
                wv.set_title("from worker"),
                wv.set_html("from worker"),
                wv.init("from worker"),
                wv.run(),
                wv.destroy(),
            ];
            (wv, results)
        })
        .join()
        .unwrap();

        for r in results {
            assert!(matches!(r, Err(WebviewError::WrongThread { .. })), "got {:?}", r);
        }
        assert_eq!(webview.state(), Created);
        assert_eq!(probe.title(), "");
        assert!(webview.set_title("from ui").is_ok());
    }
}
