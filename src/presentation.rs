//! Presentation policy: title, size and resize constraints, user agent and the
//! content source of the window.
//!
//! [`Presentation`] is the layer's own record of what was applied to the native
//! window. It is also where user resize attempts are constrained by the current
//! [`SizeHint`], so the behaviour can be checked without a real window manager.

use std::fmt::{Debug, Display, Formatter};
use serde::{Deserialize, Serialize};
use url::Url;

/// How width/height constrain resizing of the native window.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeHint {
    /// Width and height are the default size, the user can resize freely
    #[default]
    None,
    /// The user cannot resize the window
    Fixed,
    /// Width and height are a lower bound on resizing
    Min,
    /// Width and height are an upper bound on resizing
    Max,
}

/// Window size in logical pixels.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl Debug for WindowSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "WindowSize {{ {}x{} }}", self.width, self.height)
    }
}

impl WindowSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// What the window currently displays. Last one applied wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Url(Url),
    InlineMarkup(String),
}

impl Display for ContentSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentSource::Url(url) => write!(f, "{url}"),
            ContentSource::InlineMarkup(html) => write!(f, "inline markup ({} bytes)", html.len()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Presentation {
    title: String,
    /// Size as last reported to the host (after constraints)
    size: WindowSize,
    /// Dimensions passed with the current hint
    hint_size: WindowSize,
    hint: SizeHint,
    user_agent: Option<String>,
    content: Option<ContentSource>,
}

impl Presentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn size(&self) -> WindowSize {
        self.size
    }

    pub fn hint(&self) -> SizeHint {
        self.hint
    }

    /// Apply a new size and hint. The new hint replaces the previous one.
    ///
    /// For `Min` and `Max` the dimensions are bounds, not a size: the current size
    /// is clamped into the new bound instead of being replaced.
    pub fn set_size(&mut self, width: u32, height: u32, hint: SizeHint) -> WindowSize {
        let requested = WindowSize::new(width, height);
        self.hint = hint;
        self.hint_size = requested;

        self.size = match hint {
            SizeHint::None | SizeHint::Fixed => requested,
            SizeHint::Min | SizeHint::Max => {
                if self.size == WindowSize::default() {
                    requested
                } else {
                    self.constrain(self.size)
                }
            }
        };
        self.size
    }

    /// Size the window would end up with if the user tried to resize it to
    /// `requested`, given the current hint.
    pub fn constrain(&self, requested: WindowSize) -> WindowSize {
        match self.hint {
            SizeHint::None => requested,
            SizeHint::Fixed => self.size,
            SizeHint::Min => WindowSize::new(
                requested.width.max(self.hint_size.width),
                requested.height.max(self.hint_size.height),
            ),
            SizeHint::Max => WindowSize::new(
                requested.width.min(self.hint_size.width),
                requested.height.min(self.hint_size.height),
            ),
        }
    }

    /// Handle a user resize attempt. Returns the new size when it changed.
    pub fn user_resize(&mut self, requested: WindowSize) -> Option<WindowSize> {
        let constrained = self.constrain(requested);
        if constrained == self.size {
            return None;
        }
        self.size = constrained;
        Some(constrained)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn set_user_agent(&mut self, value: impl Into<String>) {
        self.user_agent = Some(value.into());
    }

    pub fn content(&self) -> Option<&ContentSource> {
        self.content.as_ref()
    }

    pub fn set_content(&mut self, source: ContentSource) {
        self.content = Some(source);
    }
}
