pub mod backend;

/// Native backends shipped with the crate.
pub mod backends {
    /// In-memory backend without a display
    pub mod headless;
}

pub use backend::{NativeBackend, NativeOptions};
