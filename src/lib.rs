//! saiku-embed - fetch Saiku query results and render them.
//!
//! The library resolves layered connection and render settings, builds the
//! export request, and dispatches the response to a renderer chosen by the
//! caller or by the server's presentation hints.

pub mod auth;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod render;
pub mod response;
pub mod transport;

pub use config::{
    resolve_connection, resolve_render_request, ConnectionOverrides, ConnectionSettings,
    ParamValue, Params, RenderOverrides, RenderRequest,
};
pub use error::{Result, SaikuError};
pub use executor::{DispatchOutcome, SaikuClient};
pub use render::{RenderKind, Renderer, RendererRegistry, Surface};
pub use response::QueryResultEnvelope;
