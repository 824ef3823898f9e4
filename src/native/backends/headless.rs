use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use anyhow::{anyhow, bail, Result};
use url::Url;
use crate::event_loop::EventLoopProxy;
use crate::events::NativeEvent;
use crate::handle::NativeWindowRef;
use crate::native::backend::{NativeBackend, NativeOptions};
use crate::presentation::{ContentSource, SizeHint};
use crate::script::ScriptFragment;

/// Fake native window handles, so every headless window gets a distinct one.
static NEXT_WINDOW: AtomicUsize = AtomicUsize::new(0x1000);

#[derive(Debug, Default)]
struct HeadlessState {
    initialized: bool,
    debug: bool,
    parent: Option<NativeWindowRef>,
    window: Option<NativeWindowRef>,
    title: String,
    size: Option<(u32, u32, SizeHint)>,
    user_agent: Option<String>,
    content: Option<ContentSource>,
    load_count: usize,
    executed: Vec<String>,
    failing_scripts: Option<String>,
    destroy_count: usize,
    proxy: Option<EventLoopProxy>,
}

/// Backend without a display. It records everything applied to it and reports
/// a page load (document start, then load finished) for every content change.
///
/// Use [`HeadlessBackend::probe`] before boxing the backend to keep a handle for
/// inspecting it and for simulating user actions.
pub struct HeadlessBackend {
    state: Arc<Mutex<HeadlessState>>,
    init_failure: Option<String>,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HeadlessState::default())),
            init_failure: None,
        }
    }

    /// Backend whose initialization fails, like a toolkit without a display.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            init_failure: Some(reason.into()),
            ..Self::new()
        }
    }

    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe { state: self.state.clone() }
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<HeadlessState>) -> MutexGuard<'_, HeadlessState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn content_url(source: &ContentSource) -> Option<Url> {
    match source {
        ContentSource::Url(url) => Some(url.clone()),
        ContentSource::InlineMarkup(_) => None,
    }
}

/// Posts a document start and load finish for `url`.
fn post_page_load(proxy: &EventLoopProxy, url: Option<Url>) -> crate::errors::Result<()> {
    proxy.post_native(NativeEvent::DocumentStarted { url: url.clone() })?;
    proxy.post_native(NativeEvent::LoadFinished { url })
}

impl NativeBackend for HeadlessBackend {
    fn name(&self) -> &str {
        "HeadlessBackend"
    }

    fn initialize(&mut self, options: &NativeOptions, proxy: EventLoopProxy) -> Result<()> {
        if let Some(reason) = &self.init_failure {
            bail!("cannot initialize headless toolkit: {reason}");
        }

        let mut state = self.lock();
        if state.initialized {
            bail!("headless backend is already initialized");
        }

        state.initialized = true;
        state.debug = options.debug;
        state.parent = options.parent;
        state.window = NativeWindowRef::from_handle(NEXT_WINDOW.fetch_add(1, Ordering::Relaxed));
        state.proxy = Some(proxy);
        Ok(())
    }

    fn window(&self) -> Result<NativeWindowRef> {
        self.lock().window.ok_or_else(|| anyhow!("headless window is not initialized"))
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.lock().title = title.to_string();
        Ok(())
    }

    fn set_size(&mut self, width: u32, height: u32, hint: SizeHint) -> Result<()> {
        self.lock().size = Some((width, height, hint));
        Ok(())
    }

    fn load(&mut self, source: &ContentSource) -> Result<()> {
        let proxy = {
            let mut state = self.lock();
            state.content = Some(source.clone());
            state.load_count += 1;
            state.proxy.clone()
        };

        if let Some(proxy) = proxy {
            post_page_load(&proxy, content_url(source))?;
        }
        Ok(())
    }

    fn set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        self.lock().user_agent = Some(user_agent.to_string());
        Ok(())
    }

    fn evaluate_script(&mut self, script: &ScriptFragment) -> Result<()> {
        let mut state = self.lock();
        if let Some(pattern) = &state.failing_scripts {
            if script.source().contains(pattern.as_str()) {
                bail!("uncaught exception in script");
            }
        }
        state.executed.push(script.source().to_string());
        Ok(())
    }

    fn destroy(&mut self) {
        let mut state = self.lock();
        state.destroy_count += 1;
        state.window = None;
        state.proxy = None;
    }
}

/// Shared view into a [`HeadlessBackend`]. Can be moved to other threads.
#[derive(Clone)]
pub struct HeadlessProbe {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessProbe {
    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        lock(&self.state)
    }

    fn proxy(&self) -> crate::errors::Result<EventLoopProxy> {
        self.lock().proxy.clone().ok_or(crate::errors::WebviewError::EventLoopClosed)
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    pub fn debug_enabled(&self) -> bool {
        self.lock().debug
    }

    pub fn parent(&self) -> Option<NativeWindowRef> {
        self.lock().parent
    }

    pub fn title(&self) -> String {
        self.lock().title.clone()
    }

    pub fn size(&self) -> Option<(u32, u32, SizeHint)> {
        self.lock().size
    }

    pub fn user_agent(&self) -> Option<String> {
        self.lock().user_agent.clone()
    }

    pub fn content(&self) -> Option<ContentSource> {
        self.lock().content.clone()
    }

    pub fn load_count(&self) -> usize {
        self.lock().load_count
    }

    /// Scripts evaluated so far, init and eval alike, in execution order.
    pub fn executed_scripts(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    /// Makes every script containing `pattern` fail as if it threw.
    pub fn fail_scripts_containing(&self, pattern: impl Into<String>) {
        self.lock().failing_scripts = Some(pattern.into());
    }

    pub fn destroy_count(&self) -> usize {
        self.lock().destroy_count
    }

    /// Simulates the user closing the window.
    pub fn close_window(&self) -> crate::errors::Result<()> {
        self.proxy()?.post_native(NativeEvent::CloseRequested)
    }

    /// Simulates the user dragging the window to a new size.
    pub fn resize_window(&self, width: u32, height: u32) -> crate::errors::Result<()> {
        self.proxy()?.post_native(NativeEvent::ResizeRequested { width, height })
    }

    /// Simulates a reload of the current content.
    pub fn reload(&self) -> crate::errors::Result<()> {
        let (proxy, url) = {
            let state = self.lock();
            let proxy = state.proxy.clone().ok_or(crate::errors::WebviewError::EventLoopClosed)?;
            (proxy, state.content.as_ref().and_then(content_url))
        };
        post_page_load(&proxy, url)
    }
}
