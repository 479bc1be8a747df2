use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use casd_bootstrap::{Collaborators, ConfiguredDataSourceLoader, Sequencer, TelemetryClient};
use casd_config::CasdConfig;
use casd_core::{keys, report_fatal, CasError};
use casd_daemon::{SdNotify, SignalSupervisor};
use casd_gateway::{GatewayBuilder, GatewayState, XmlRenderer};
use casd_logging::init_logger;
use casd_plugins::PluginCatalog;

#[derive(Parser)]
#[command(name = "casd")]
#[command(about = "Pluggable CAS-style single-sign-on server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the authentication server
    Serve {
        /// Path to the YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show whether a local instance is serving
    Status {
        /// Port of the instance to probe
        #[arg(long, default_value_t = 9000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            // nothing may run before configuration is loaded; without it
            // there is not even a logger to report through
            let config = match casd_config::load(config.as_deref()) {
                Ok(config) => Arc::new(config),
                Err(e) => {
                    eprintln!("could not load configuration: {e:#}");
                    std::process::exit(1);
                }
            };
            if let Err(err) = serve(config).await {
                report_fatal(&err);
                std::process::exit(1);
            }
        }
        Commands::Status { port } => status(port).await,
    }
}

async fn serve(config: Arc<CasdConfig>) -> Result<(), CasError> {
    // logger construction is fatal: nothing downstream can report errors
    // without it
    let logger = init_logger(&config.logging.level, config.logging.dir.as_deref())
        .map_err(CasError::Other)?;

    let telemetry = TelemetryClient::start(config.telemetry.as_ref());

    let sequencer = Sequencer::new(config.clone());
    sequencer
        .registry()
        .register(keys::NS_LIB, keys::LOGGER, logger, false)?;

    let renderer = Arc::new(XmlRenderer::new());
    sequencer
        .registry()
        .register(keys::NS_LIB, keys::XML, renderer.clone(), false)?;

    let orchestrator = PluginCatalog::builtin().orchestrator_for(&config.plugins)?;
    let state = GatewayState {
        registry: sequencer.registry().clone(),
        hooks: sequencer.hooks().clone(),
        renderer,
    };
    let collaborators = Collaborators {
        data_sources: Arc::new(ConfiguredDataSourceLoader::new(config.clone())),
        server: Arc::new(GatewayBuilder::new(config.clone(), state)),
        plugins: Arc::new(orchestrator),
        readiness: Arc::new(SdNotify::from_env()),
        process: Arc::new(SignalSupervisor),
    };

    let addr = sequencer.run(telemetry, collaborators).await?;
    info!(%addr, "bootstrap complete");

    // the signal supervisor exits the process; keep serving until then
    std::future::pending::<()>().await;
    Ok(())
}

async fn status(port: u16) {
    let client = reqwest::Client::new();
    match client
        .get(format!("http://localhost:{port}/api/health"))
        .send()
        .await
    {
        Ok(resp) => match resp.json::<serde_json::Value>().await {
            Ok(body) => println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default()),
            Err(e) => println!("casd responded with an unreadable body: {e}"),
        },
        Err(_) => {
            println!("casd is not running on port {port}");
        }
    }
}
