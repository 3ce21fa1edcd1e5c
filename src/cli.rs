//! Command-line argument parsing for saiku-embed.

use clap::Parser;
use saiku_embed::config::{ConnectionOverrides, ParamValue, Params, RenderOverrides};
use saiku_embed::error::{Result, SaikuError};
use saiku_embed::RenderKind;
use std::path::PathBuf;

/// Fetch a Saiku report and render it in the terminal.
#[derive(Parser, Debug)]
#[command(name = "saiku-embed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Repository path of the report (e.g., /homes/home:admin/report.saiku)
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<String>,

    /// Server base URL (e.g., http://localhost:8080/saiku)
    #[arg(short = 's', long, value_name = "URL")]
    pub server: Option<String>,

    /// API path below the server base
    #[arg(long, value_name = "PATH")]
    pub path: Option<String>,

    /// User for basic authentication
    #[arg(short = 'U', long, value_name = "USER")]
    pub user: Option<String>,

    /// Password for basic authentication
    #[arg(long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Request timeout in seconds (0 waits forever)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Render kind (table, chart, or a registered custom kind)
    #[arg(short = 'r', long, value_name = "KIND")]
    pub render: Option<String>,

    /// Render submode (e.g., sparkline, bar)
    #[arg(short = 'm', long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Result formatter requested from the server
    #[arg(long, value_name = "FORMATTER")]
    pub formatter: Option<String>,

    /// Mount point label for the output
    #[arg(long, value_name = "MOUNT")]
    pub mount: Option<String>,

    /// Disable the wide chart scale
    #[arg(long)]
    pub no_zoom: bool,

    /// Report parameter as key=value (repeatable)
    #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(saiku_embed::config::Config::default_path)
    }

    /// Converts CLI arguments to connection overrides.
    pub fn to_connection_overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            server: self.server.clone(),
            path: self.path.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            timeout_secs: self.timeout,
        }
    }

    /// Converts CLI arguments to render overrides.
    ///
    /// Parameters are only set when at least one `--param` is given, so a
    /// config file's parameters survive otherwise.
    pub fn to_render_overrides(&self) -> Result<RenderOverrides> {
        let params = if self.params.is_empty() {
            None
        } else {
            Some(parse_params(&self.params)?)
        };

        Ok(RenderOverrides {
            file: self.file.clone(),
            render: self.render.as_deref().map(RenderKind::from),
            mode: self.mode.clone(),
            formatter: self.formatter.clone(),
            html_object: self.mount.clone(),
            zoom: self.no_zoom.then_some(false),
            params,
        })
    }
}

/// Parses `key=value` pairs. Values are sent as text.
fn parse_params(raw: &[String]) -> Result<Params> {
    raw.iter()
        .map(|pair| {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                SaikuError::config(format!("Invalid parameter '{pair}'. Expected KEY=VALUE"))
            })?;
            if key.is_empty() {
                return Err(SaikuError::config(format!(
                    "Invalid parameter '{pair}'. Key is empty"
                )));
            }
            Ok((key.to_string(), ParamValue::from(value)))
        })
        .collect()
}
