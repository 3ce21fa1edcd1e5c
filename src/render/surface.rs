//! Output surfaces addressed by mount point.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Where rendered output, error text and alerts end up.
///
/// `mount` identifies a location on the surface (a selector on a web page,
/// a pane in a terminal). Implementations must be shareable across tasks.
pub trait Surface: Send + Sync {
    /// Replaces the content at `mount` with plain text.
    fn set_text(&self, mount: &str, text: &str);

    /// Shows a notification that is not tied to a mount point.
    fn alert(&self, message: &str);
}

/// Writes mount content to stdout and alerts to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSurface;

impl Surface for StdoutSurface {
    fn set_text(&self, _mount: &str, text: &str) {
        println!("{text}");
    }

    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// In-memory surface that records everything written to it.
#[derive(Debug, Default)]
pub struct MemorySurface {
    mounts: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
    alerts: Mutex<Vec<String>>,
}

impl MemorySurface {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current text at `mount`.
    pub fn text(&self, mount: &str) -> Option<String> {
        lock(&self.mounts).get(mount).cloned()
    }

    /// Returns every write in order, as `(mount, text)` pairs.
    pub fn writes(&self) -> Vec<(String, String)> {
        lock(&self.writes).clone()
    }

    /// Returns every alert in order.
    pub fn alerts(&self) -> Vec<String> {
        lock(&self.alerts).clone()
    }
}

impl Surface for MemorySurface {
    fn set_text(&self, mount: &str, text: &str) {
        lock(&self.mounts).insert(mount.to_string(), text.to_string());
        lock(&self.writes).push((mount.to_string(), text.to_string()));
    }

    fn alert(&self, message: &str) {
        lock(&self.alerts).push(message.to_string());
    }
}

/// Locks a mutex, recovering the data if a writer panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
