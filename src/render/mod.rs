//! Renderers and the registry that selects them.
//!
//! A renderer is built from a query result plus the resolved render options
//! and writes its output to a [`Surface`]. The registry maps render kind
//! names to renderer factories and can be extended by the embedding
//! application.

pub mod chart;
pub mod surface;
pub mod table;

pub use chart::ChartRenderer;
pub use surface::{MemorySurface, StdoutSurface, Surface};
pub use table::TableRenderer;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::RenderRequest;
use crate::response::QueryResultEnvelope;

/// Output family for a query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RenderKind {
    /// Tabular output.
    #[default]
    Table,
    /// Chart output.
    Chart,
    /// Any other kind, resolved through the registry.
    Other(String),
}

impl RenderKind {
    /// Returns the kind's registry name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Table => "table",
            Self::Chart => "chart",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for RenderKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "table" => Self::Table,
            "chart" => Self::Chart,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for RenderKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<RenderKind> for String {
    fn from(kind: RenderKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A renderer bound to one result.
pub trait Renderer {
    /// Writes the result to the surface.
    fn render(&self, surface: &dyn Surface);
}

/// Builds a renderer from a result and its resolved render options.
pub type RendererFactory =
    Arc<dyn Fn(QueryResultEnvelope, RenderRequest) -> Box<dyn Renderer> + Send + Sync>;

/// Mapping from render kind to renderer factory.
#[derive(Clone, Default)]
pub struct RendererRegistry {
    factories: HashMap<RenderKind, RendererFactory>,
}

impl RendererRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in `table` and `chart` renderers.
    pub fn with_defaults() -> Self {
        Self::new()
            .with(RenderKind::Table, |envelope, request| {
                Box::new(TableRenderer::new(envelope, request))
            })
            .with(RenderKind::Chart, |envelope, request| {
                Box::new(ChartRenderer::new(envelope, request))
            })
    }

    /// Registers a factory, replacing any existing one for the same kind.
    pub fn register<F>(&mut self, kind: impl Into<RenderKind>, factory: F)
    where
        F: Fn(QueryResultEnvelope, RenderRequest) -> Box<dyn Renderer> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, kind: impl Into<RenderKind>, factory: F) -> Self
    where
        F: Fn(QueryResultEnvelope, RenderRequest) -> Box<dyn Renderer> + Send + Sync + 'static,
    {
        self.register(kind, factory);
        self
    }

    /// Removes a kind, returning true if it was registered.
    pub fn unregister(&mut self, kind: &RenderKind) -> bool {
        self.factories.remove(kind).is_some()
    }

    /// Returns true if a factory is registered for `kind`.
    pub fn contains(&self, kind: &RenderKind) -> bool {
        self.factories.contains_key(kind)
    }

    /// Builds the renderer for `kind`, or `None` if it is not registered.
    pub fn create(
        &self,
        kind: &RenderKind,
        envelope: QueryResultEnvelope,
        request: RenderRequest,
    ) -> Option<Box<dyn Renderer>> {
        self.factories
            .get(kind)
            .map(|factory| factory(envelope, request))
    }

    /// Returns the registered kinds, sorted by name.
    pub fn kinds(&self) -> Vec<&RenderKind> {
        let mut kinds: Vec<_> = self.factories.keys().collect();
        kinds.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        kinds
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// Truncates a string to `max_width` characters, adding an ellipsis if needed.
pub(crate) fn truncate(s: &str, max_width: usize) -> String {
    let len = s.chars().count();
    if len <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let mut out: String = s.chars().take(max_width - 3).collect();
        out.push_str("...");
        out
    }
}
