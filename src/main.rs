//! saiku-embed - fetch a Saiku report and render it in the terminal.

mod cli;

use std::sync::Arc;

use cli::Cli;
use saiku_embed::config::{Config, ConnectionOverrides, RenderOverrides};
use saiku_embed::error::Result;
use saiku_embed::logging;
use saiku_embed::render::StdoutSurface;
use saiku_embed::SaikuClient;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    logging::init_stderr_logging();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    // Precedence: CLI arguments, then config file, then environment.
    let connection = resolve_connection_overrides(&cli, &config);
    let mut render: RenderOverrides = config.render.clone();
    render.merge(cli.to_render_overrides()?);

    let client = SaikuClient::new(&connection)?.with_surface(Arc::new(StdoutSurface));
    info!("Connection: {}", client.settings().display_string());

    client.execute_and_wait(render).await?.into_result()
}

/// Layers CLI over config file over environment variables.
fn resolve_connection_overrides(cli: &Cli, config: &Config) -> ConnectionOverrides {
    let mut overrides = config.connection.clone();
    overrides.merge(&cli.to_connection_overrides());
    overrides.apply_env_defaults();
    overrides
}
