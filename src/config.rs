//! Configuration management for saiku-embed.
//!
//! Two layers of settings are resolved here:
//!
//! - [`ConnectionSettings`]: where the reporting service lives and how to
//!   authenticate, built from built-in defaults and per-client overrides.
//! - [`RenderRequest`]: what to run and how to show it, built from render
//!   defaults and per-execution overrides.
//!
//! Both merges are shallow: a field present in the overrides replaces the
//! default field as a whole. This matters for `params`, which is never
//! merged key by key.
//!
//! Overrides can also be loaded from a TOML file and from `SAIKU_*`
//! environment variables.

use crate::error::{SaikuError, Result};
use crate::render::RenderKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default server base (usually a path on the embedding page's origin).
pub const DEFAULT_SERVER: &str = "/saiku";

/// Default REST path of the embed API.
pub const DEFAULT_PATH: &str = "/rest/saiku/embed";

/// Default credentials shipped with a stock Saiku install.
pub const DEFAULT_USER: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";

/// Default timeout for a query request. Zero disables the timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default result formatter; `flattened` yields a plain cell grid.
pub const DEFAULT_FORMATTER: &str = "flattened";

/// Default mount point for rendered output.
pub const DEFAULT_MOUNT: &str = "#saiku";

/// Endpoint appended to `server + path` for JSON exports.
pub const EXPORT_ENDPOINT: &str = "/export/saiku/json";

/// Connection settings for one client instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Server base URL, e.g. `http://localhost:8080/saiku`.
    pub server: String,

    /// API path below the server base. May be empty.
    pub path: String,

    /// Basic-auth user. Empty means unauthenticated.
    pub user: String,

    /// Basic-auth password. Empty means unauthenticated.
    pub password: String,

    /// Request timeout in seconds (0 = wait forever).
    pub timeout_secs: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            path: DEFAULT_PATH.to_string(),
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ConnectionSettings {
    /// Returns the full export URL: `server + path + /export/saiku/json`.
    pub fn endpoint_url(&self) -> String {
        format!("{}{}{}", self.server, self.path, EXPORT_ENDPOINT)
    }

    /// Returns `(user, password)` when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.user.is_empty() || self.password.is_empty() {
            None
        } else {
            Some((&self.user, &self.password))
        }
    }

    /// Returns a display-safe string (no password) for logs.
    pub fn display_string(&self) -> String {
        match self.credentials() {
            Some((user, _)) => format!("{user} @ {}{}", self.server, self.path),
            None => format!("anonymous @ {}{}", self.server, self.path),
        }
    }
}

/// Per-client overrides for [`ConnectionSettings`]. Unset fields keep the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOverrides {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ConnectionOverrides {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges another set of overrides into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &ConnectionOverrides) {
        if other.server.is_some() {
            self.server = other.server.clone();
        }
        if other.path.is_some() {
            self.path = other.path.clone();
        }
        if other.user.is_some() {
            self.user = other.user.clone();
        }
        if other.password.is_some() {
            self.password = other.password.clone();
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }

    /// Applies environment variables (SAIKU_SERVER, SAIKU_USER, etc.) to unset fields.
    pub fn apply_env_defaults(&mut self) {
        if self.server.is_none() {
            self.server = std::env::var("SAIKU_SERVER").ok();
        }
        if self.path.is_none() {
            self.path = std::env::var("SAIKU_PATH").ok();
        }
        if self.user.is_none() {
            self.user = std::env::var("SAIKU_USER").ok();
        }
        if self.password.is_none() {
            self.password = std::env::var("SAIKU_PASSWORD").ok();
        }
        if self.timeout_secs.is_none() {
            if let Ok(secs) = std::env::var("SAIKU_TIMEOUT_SECS") {
                match secs.trim().parse() {
                    Ok(secs) => self.timeout_secs = Some(secs),
                    Err(e) => warn!("Ignoring invalid SAIKU_TIMEOUT_SECS '{}': {}", secs, e),
                }
            }
        }
    }
}

/// Resolves connection settings: every field set in `overrides` wins.
///
/// No validation is done here. A malformed server URL or bad credentials
/// only surface once a request is sent.
pub fn resolve_connection(
    defaults: &ConnectionSettings,
    overrides: &ConnectionOverrides,
) -> ConnectionSettings {
    ConnectionSettings {
        server: overrides
            .server
            .clone()
            .unwrap_or_else(|| defaults.server.clone()),
        path: overrides.path.clone().unwrap_or_else(|| defaults.path.clone()),
        user: overrides.user.clone().unwrap_or_else(|| defaults.user.clone()),
        password: overrides
            .password
            .clone()
            .unwrap_or_else(|| defaults.password.clone()),
        timeout_secs: overrides.timeout_secs.unwrap_or(defaults.timeout_secs),
    }
}

/// A scalar report parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Report parameters, keyed by parameter name.
pub type Params = BTreeMap<String, ParamValue>;

/// Fully resolved options for one `execute` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Repository path of the report, sent as `file`.
    pub file: Option<String>,

    /// Renderer family to use.
    pub render: RenderKind,

    /// Kind-specific variant, e.g. `sparkline` for tables or `line` for charts.
    pub mode: Option<String>,

    /// Server-side result formatter.
    pub formatter: String,

    /// Mount point that receives rendered output and error text.
    pub html_object: String,

    /// Whether charts may use the wide (zoomed) scale.
    pub zoom: bool,

    /// Report parameters, each sent as `param<key>`.
    pub params: Params,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            file: None,
            render: RenderKind::Table,
            mode: None,
            formatter: DEFAULT_FORMATTER.to_string(),
            html_object: DEFAULT_MOUNT.to_string(),
            zoom: true,
            params: Params::new(),
        }
    }
}

/// Per-execution overrides for [`RenderRequest`].
///
/// `params` follows replace semantics: `Some(map)` replaces the default
/// parameters entirely (an empty map clears them), `None` keeps them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderOverrides {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub render: Option<RenderKind>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub formatter: Option<String>,
    #[serde(default, alias = "mount")]
    pub html_object: Option<String>,
    #[serde(default)]
    pub zoom: Option<bool>,
    #[serde(default)]
    pub params: Option<Params>,
}

impl RenderOverrides {
    /// Creates empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the report file.
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the render kind.
    pub fn render(mut self, kind: impl Into<RenderKind>) -> Self {
        self.render = Some(kind.into());
        self
    }

    /// Sets the render submode.
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Sets the result formatter.
    pub fn formatter(mut self, formatter: impl Into<String>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }

    /// Sets the mount point.
    pub fn mount(mut self, mount: impl Into<String>) -> Self {
        self.html_object = Some(mount.into());
        self
    }

    /// Enables or disables zoom.
    pub fn zoom(mut self, zoom: bool) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// Adds one parameter.
    ///
    /// The first call switches `params` to `Some`, so the resulting map
    /// replaces the default parameters rather than extending them.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params
            .get_or_insert_with(Params::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replaces the parameter map.
    pub fn params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// Merges another set of overrides into this one, with the other taking precedence.
    pub fn merge(&mut self, other: RenderOverrides) {
        if other.file.is_some() {
            self.file = other.file;
        }
        if other.render.is_some() {
            self.render = other.render;
        }
        if other.mode.is_some() {
            self.mode = other.mode;
        }
        if other.formatter.is_some() {
            self.formatter = other.formatter;
        }
        if other.html_object.is_some() {
            self.html_object = other.html_object;
        }
        if other.zoom.is_some() {
            self.zoom = other.zoom;
        }
        if other.params.is_some() {
            self.params = other.params;
        }
    }
}

/// Resolves render options field by field. `params` is replaced whole, never merged.
pub fn resolve_render_request(defaults: &RenderRequest, overrides: &RenderOverrides) -> RenderRequest {
    RenderRequest {
        file: overrides.file.clone().or_else(|| defaults.file.clone()),
        render: overrides
            .render
            .clone()
            .unwrap_or_else(|| defaults.render.clone()),
        mode: overrides.mode.clone().or_else(|| defaults.mode.clone()),
        formatter: overrides
            .formatter
            .clone()
            .unwrap_or_else(|| defaults.formatter.clone()),
        html_object: overrides
            .html_object
            .clone()
            .unwrap_or_else(|| defaults.html_object.clone()),
        zoom: overrides.zoom.unwrap_or(defaults.zoom),
        params: overrides
            .params
            .clone()
            .unwrap_or_else(|| defaults.params.clone()),
    }
}

/// Contents of the optional TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Connection overrides.
    #[serde(default)]
    pub connection: ConnectionOverrides,

    /// Render option overrides.
    #[serde(default)]
    pub render: RenderOverrides,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("saiku-embed")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields an empty config.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SaikuError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            SaikuError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
