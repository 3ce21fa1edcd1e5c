//! Shared helpers for integration tests.

use std::sync::{Arc, Mutex};

use saiku_embed::render::{MemorySurface, Renderer, RendererRegistry, Surface};
use saiku_embed::transport::MockTransport;
use saiku_embed::{ConnectionSettings, RenderKind, RenderRequest, SaikuClient};

/// Renderer calls seen by a recording registry, as `(kind, mode)`.
pub type RenderLog = Arc<Mutex<Vec<(String, Option<String>)>>>;

struct RecordingRenderer {
    kind: String,
    request: RenderRequest,
    log: RenderLog,
}

impl Renderer for RecordingRenderer {
    fn render(&self, surface: &dyn Surface) {
        surface.set_text(&self.request.html_object, &format!("rendered by {}", self.kind));
        self.log
            .lock()
            .unwrap()
            .push((self.kind.clone(), self.request.mode.clone()));
    }
}

/// Builds a registry whose renderers record their calls.
pub fn recording_registry(kinds: &[&str]) -> (RendererRegistry, RenderLog) {
    let log = RenderLog::default();
    let mut registry = RendererRegistry::new();
    for kind in kinds {
        let name = kind.to_string();
        let log = Arc::clone(&log);
        registry.register(RenderKind::from(*kind), move |_envelope, request| {
            Box::new(RecordingRenderer {
                kind: name.clone(),
                request,
                log: Arc::clone(&log),
            })
        });
    }
    (registry, log)
}

/// A client wired to the given mock, a recording registry and a memory surface.
pub struct Harness {
    pub client: SaikuClient,
    pub transport: Arc<MockTransport>,
    pub surface: Arc<MemorySurface>,
    pub log: RenderLog,
}

impl Harness {
    pub fn new(transport: MockTransport) -> Self {
        Self::with_settings(transport, test_settings())
    }

    pub fn with_settings(transport: MockTransport, settings: ConnectionSettings) -> Self {
        let transport = Arc::new(transport);
        let surface = Arc::new(MemorySurface::new());
        let (registry, log) = recording_registry(&["table", "chart"]);
        let client = SaikuClient::with_transport(settings, transport.clone())
            .with_registry(registry)
            .with_surface(surface.clone());
        Self {
            client,
            transport,
            surface,
            log,
        }
    }

    /// Returns the recorded renderer calls.
    pub fn rendered(&self) -> Vec<(String, Option<String>)> {
        self.log.lock().unwrap().clone()
    }
}

/// Settings pointing at a fake absolute server.
pub fn test_settings() -> ConnectionSettings {
    ConnectionSettings {
        server: "http://saiku.test/saiku".to_string(),
        ..ConnectionSettings::default()
    }
}

/// A flattened result body, optionally carrying presentation hints.
pub fn result_body(mode: Option<&str>, render_type: Option<&str>) -> String {
    let mut properties = serde_json::Map::new();
    if let Some(mode) = mode {
        properties.insert("saiku.ui.render.mode".to_string(), mode.into());
    }
    if let Some(render_type) = render_type {
        properties.insert("saiku.ui.render.type".to_string(), render_type.into());
    }
    serde_json::json!({
        "query": { "name": "sales", "properties": properties },
        "cellset": [
            [
                {"value": "Region", "type": "ROW_HEADER_HEADER", "properties": {}},
                {"value": "Revenue", "type": "COLUMN_HEADER", "properties": {}}
            ],
            [
                {"value": "EU", "type": "ROW_HEADER", "properties": {}},
                {"value": "1,200", "type": "DATA_CELL", "properties": {"raw": "1200"}}
            ]
        ],
        "height": 2,
        "width": 2,
        "runtime": 15
    })
    .to_string()
}
