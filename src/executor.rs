//! Query execution and result dispatch.
//!
//! [`SaikuClient`] turns resolved render options into one export request,
//! sends it on a background task and routes the response to a renderer.
//! Each call ends in exactly one [`DispatchOutcome`]; the client itself is
//! reusable.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::auth::basic_auth_header;
use crate::config::{
    resolve_connection, resolve_render_request, ConnectionOverrides, ConnectionSettings,
    RenderOverrides, RenderRequest,
};
use crate::error::{SaikuError, Result};
use crate::render::{RenderKind, RendererRegistry, StdoutSurface, Surface};
use crate::response::QueryResultEnvelope;
use crate::transport::{HttpTransport, OutboundRequest, Transport, TransportFailure};

/// Prefix that namespaces report parameters in the query string.
pub const PARAM_PREFIX: &str = "param";

/// Terminal state of one `execute` call.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A renderer was built and ran.
    Rendered {
        kind: RenderKind,
        mode: Option<String>,
    },
    /// The effective render kind has no registered renderer.
    RenderKindUnrecognized { kind: RenderKind },
    /// The request failed; the mount point shows the status text.
    TransportFailed(TransportFailure),
}

impl DispatchOutcome {
    /// Returns true if a renderer ran.
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }

    /// Converts the outcome into a result for callers that treat
    /// anything but a render as an error.
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Rendered { .. } => Ok(()),
            Self::RenderKindUnrecognized { kind } => Err(SaikuError::render(
                unrecognized_kind_message(&kind),
            )),
            Self::TransportFailed(failure) => Err(SaikuError::transport(failure.to_string())),
        }
    }
}

/// Client for one reporting service.
pub struct SaikuClient {
    settings: Arc<ConnectionSettings>,
    render_defaults: RenderRequest,
    transport: Arc<dyn Transport>,
    registry: Arc<RendererRegistry>,
    surface: Arc<dyn Surface>,
}

impl SaikuClient {
    /// Creates a client over HTTP with the built-in defaults and the given overrides.
    pub fn new(overrides: &ConnectionOverrides) -> Result<Self> {
        let settings = resolve_connection(&ConnectionSettings::default(), overrides);
        Ok(Self::with_transport(settings, Arc::new(HttpTransport::new()?)))
    }

    /// Creates a client with resolved settings and a custom transport.
    ///
    /// Uses the default renderer registry, default render options, and
    /// writes to stdout until another surface is set.
    pub fn with_transport(settings: ConnectionSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings: Arc::new(settings),
            render_defaults: RenderRequest::default(),
            transport,
            registry: Arc::new(RendererRegistry::with_defaults()),
            surface: Arc::new(StdoutSurface),
        }
    }

    /// Replaces the renderer registry.
    pub fn with_registry(mut self, registry: RendererRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Replaces the output surface.
    pub fn with_surface(mut self, surface: Arc<dyn Surface>) -> Self {
        self.surface = surface;
        self
    }

    /// Replaces the render defaults that per-call overrides are layered on.
    pub fn with_render_defaults(mut self, defaults: RenderRequest) -> Self {
        self.render_defaults = defaults;
        self
    }

    /// Returns the active connection settings.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Returns the renderer registry.
    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    /// Returns the render defaults.
    pub fn render_defaults(&self) -> &RenderRequest {
        &self.render_defaults
    }

    /// Applies overrides on top of the current settings.
    ///
    /// Calls already in flight keep the settings they were started with.
    pub fn reconfigure(&mut self, overrides: &ConnectionOverrides) {
        self.settings = Arc::new(resolve_connection(&self.settings, overrides));
        info!("Reconfigured connection: {}", self.settings.display_string());
    }

    /// Resolves per-call overrides against the client's render defaults.
    pub fn resolve(&self, overrides: &RenderOverrides) -> RenderRequest {
        resolve_render_request(&self.render_defaults, overrides)
    }

    /// Builds the outbound request for resolved render options.
    pub fn build_request(&self, request: &RenderRequest) -> Result<OutboundRequest> {
        build_outbound(&self.settings, request)
    }

    /// Starts one query and returns immediately.
    ///
    /// The request runs on a tokio task; the returned handle yields the
    /// outcome once the response has been dispatched. Credential encoding
    /// failures, and calls made outside a tokio runtime, are returned as
    /// errors before anything is sent.
    pub fn execute(&self, overrides: RenderOverrides) -> Result<JoinHandle<DispatchOutcome>> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SaikuError::internal(format!("No async runtime to run the query on: {e}")))?;
        let request = self.resolve(&overrides);
        let outbound = self.build_request(&request)?;

        info!(
            file = request.file.as_deref().unwrap_or(""),
            render = %request.render,
            url = %outbound.url,
            "Sending query request"
        );

        let transport = Arc::clone(&self.transport);
        let registry = Arc::clone(&self.registry);
        let surface = Arc::clone(&self.surface);

        Ok(runtime.spawn(async move {
            let response = transport.fetch(&outbound).await;
            dispatch(response, request, &registry, surface.as_ref())
        }))
    }

    /// Runs one query and waits for its outcome.
    pub async fn execute_and_wait(&self, overrides: RenderOverrides) -> Result<DispatchOutcome> {
        let handle = self.execute(overrides)?;
        handle
            .await
            .map_err(|e| SaikuError::internal(format!("Query task failed: {e}")))
    }
}

/// Builds the outbound request from connection settings and render options.
///
/// Every parameter `key` is sent as `param<key>` so it cannot collide with
/// the fixed `formatter` and `file` fields. An absent file is sent empty.
pub fn build_outbound(
    settings: &ConnectionSettings,
    request: &RenderRequest,
) -> Result<OutboundRequest> {
    let mut fields: Vec<(String, String)> = request
        .params
        .iter()
        .map(|(key, value)| (format!("{PARAM_PREFIX}{key}"), value.to_string()))
        .collect();
    fields.push(("formatter".to_string(), request.formatter.clone()));
    fields.push((
        "file".to_string(),
        request.file.clone().unwrap_or_default(),
    ));

    let authorization = match settings.credentials() {
        Some((user, password)) => Some(basic_auth_header(user, password)?),
        None => None,
    };

    let timeout = (settings.timeout_secs > 0).then(|| Duration::from_secs(settings.timeout_secs));

    let outbound = OutboundRequest {
        url: settings.endpoint_url(),
        fields,
        authorization,
        timeout,
    };
    debug!(
        url = %outbound.url,
        fields = outbound.fields.len(),
        authenticated = outbound.authorization.is_some(),
        "Built query request"
    );
    Ok(outbound)
}

/// Applies server presentation hints to the request.
///
/// A non-empty `saiku.ui.render.mode` replaces the render kind and a
/// non-empty `saiku.ui.render.type` replaces the submode, for this call only.
pub fn apply_hints(envelope: &QueryResultEnvelope, request: &mut RenderRequest) {
    if let Some(mode) = envelope.render_mode_hint() {
        let kind = RenderKind::from(mode);
        if kind != request.render {
            debug!(requested = %request.render, server = %kind, "Server overrides render kind");
        }
        request.render = kind;
    }
    if let Some(submode) = envelope.render_type_hint() {
        request.mode = Some(submode.to_string());
    }
}

/// Routes one response to a renderer, or reports the failure.
pub fn dispatch(
    response: std::result::Result<QueryResultEnvelope, TransportFailure>,
    mut request: RenderRequest,
    registry: &RendererRegistry,
    surface: &dyn Surface,
) -> DispatchOutcome {
    match response {
        Ok(envelope) => {
            apply_hints(&envelope, &mut request);
            let kind = request.render.clone();
            let mode = request.mode.clone();

            match registry.create(&kind, envelope, request) {
                Some(renderer) => {
                    renderer.render(surface);
                    info!(render = %kind, mode = mode.as_deref().unwrap_or(""), "Rendered query result");
                    DispatchOutcome::Rendered { kind, mode }
                }
                None => {
                    let message = unrecognized_kind_message(&kind);
                    warn!(render = %kind, "{message}");
                    surface.alert(&message);
                    DispatchOutcome::RenderKindUnrecognized { kind }
                }
            }
        }
        Err(failure) => {
            surface.set_text(&request.html_object, &format!("Error: {}", failure.status_text));
            error!(status = %failure.status_text, "Query request failed");
            error!(raw = %failure.raw, "Raw failure");
            error!(thrown = failure.thrown.as_deref().unwrap_or(""), "Thrown error");
            DispatchOutcome::TransportFailed(failure)
        }
    }
}

fn unrecognized_kind_message(kind: &RenderKind) -> String {
    format!("Render type {kind} not found!")
}
