//! Script bridge: persistent init scripts and one-shot eval scripts.
//!
//! Both kinds are fire-and-forget. There is no return channel: whatever a script
//! evaluates to, or throws, is dropped by this layer. Init scripts are kept here
//! in registration order and replayed at the start of every document. Eval
//! scripts are posted into the event loop queue (see [`crate::event_loop`]) and
//! handed to the backend when the loop gets to them.

use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use crate::native::NativeBackend;

/// What a script fragment is used for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScriptKind {
    /// Re-applied on every page load, before the load completes
    Init,
    /// Applied once, asynchronously, result discarded
    Eval,
}

/// Immutable script payload. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ScriptFragment(Arc<str>);

impl ScriptFragment {
    pub fn new(source: impl AsRef<str>) -> Self {
        Self(Arc::from(source.as_ref()))
    }

    pub fn source(&self) -> &str {
        &self.0
    }
}

impl Debug for ScriptFragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        const PREVIEW: usize = 40;
        match self.0.char_indices().nth(PREVIEW) {
            Some((idx, _)) => write!(f, "ScriptFragment({:?}…)", &self.0[..idx]),
            None => write!(f, "ScriptFragment({:?})", &self.0),
        }
    }
}

impl Display for ScriptFragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScriptFragment {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ScriptFragment {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

#[derive(Debug, Default)]
pub struct ScriptBridge {
    init_scripts: Vec<ScriptFragment>,
}

impl ScriptBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a persistent script. Scripts accumulate in call order.
    pub fn register_init(&mut self, script: ScriptFragment) {
        log::debug!("registered init script #{}: {:?}", self.init_scripts.len(), script);
        self.init_scripts.push(script);
    }

    pub fn init_scripts(&self) -> &[ScriptFragment] {
        &self.init_scripts
    }

    /// Runs every init script, in registration order, against the document that
    /// just started. Script failures are logged and skipped.
    pub fn apply_init(&self, backend: &mut dyn NativeBackend) -> usize {
        for script in &self.init_scripts {
            run_script(backend, ScriptKind::Init, script);
        }
        self.init_scripts.len()
    }
}

/// Hands one script to the backend and swallows any failure.
pub(crate) fn run_script(backend: &mut dyn NativeBackend, kind: ScriptKind, script: &ScriptFragment) {
    if let Err(e) = backend.evaluate_script(script) {
        log::debug!("{kind:?} script discarded error from {}: {e:#}", backend.name());
    }
}
