mod check_config_cmd;
mod dashboard_cmd;
mod hash_password_cmd;
mod status_cmd;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use statusgate_config::{load_and_prepare, process_env, redacted_view, validate, StatusGateConfig};
use statusgate_gateway::{start_server, GatewayState};
use statusgate_logging::{init_logger, LoggingOptions};

#[derive(Parser)]
#[command(name = "statusgate")]
#[command(about = "statusgate: cluster status service behind a rate-limiting auth gateway")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file (defaults to $STATUSGATE_CONFIG or ./statusgate.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway and status server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind to
        #[arg(long)]
        bind: Option<String>,
    },
    /// Query a running server's health and status
    Status {
        /// Base URL of the server (defaults to dashboard.baseUrl)
        #[arg(long)]
        url: Option<String>,
        /// API key for /api/status
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Poll the cluster and show one row per server
    Dashboard {
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        /// Concurrent requests per round
        #[arg(long)]
        fan_out: Option<usize>,
        /// Seconds between rounds
        #[arg(long)]
        interval: Option<u64>,
        /// Run a single round and exit
        #[arg(long)]
        once: bool,
    },
    /// Produce an Argon2id hash for ADMIN_PASSWORD_HASH
    HashPassword {
        /// Password to hash; read from stdin when omitted
        password: Option<String>,
    },
    /// Load and validate the configuration, then print it with secrets redacted
    CheckConfig,
}

/// Installs the subscriber described by the config, then replays the
/// validation warnings that were raised before it existed.
fn init_logging(config: &StatusGateConfig, level_override: Option<&str>) {
    init_logger(&LoggingOptions {
        level: level_override.unwrap_or(&config.logging.level).to_string(),
        json: config.logging.is_json(),
        dir: config.logging.dir.as_ref().map(PathBuf::from),
    });
    for warning in validate(config).warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
}

async fn load_config(path: Option<&Path>) -> Result<StatusGateConfig> {
    let env = process_env();
    match load_and_prepare(path, &env).await {
        Ok(config) => Ok(config),
        Err(e) => {
            init_logger(&LoggingOptions::default());
            error!(error = %format!("{e:#}"), "Failed to load configuration");
            Err(e)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve { port, bind } => {
            let mut config = load_config(config_path).await?;
            init_logging(&config, None);
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            run_server(config).await?;
        }
        Commands::Status { url, api_key } => {
            let config = load_config(config_path).await?;
            init_logging(&config, Some("warn"));
            status_cmd::run(&config, url, api_key).await?;
        }
        Commands::Dashboard {
            url,
            api_key,
            fan_out,
            interval,
            once,
        } => {
            let config = load_config(config_path).await?;
            init_logging(&config, Some("warn"));
            let overrides = dashboard_cmd::Overrides {
                url,
                api_key,
                fan_out,
                interval,
                once,
            };
            dashboard_cmd::run(&config, overrides).await?;
        }
        Commands::HashPassword { password } => {
            init_logger(&LoggingOptions::default());
            hash_password_cmd::run(password.as_deref())?;
        }
        Commands::CheckConfig => {
            let config = load_config(config_path).await?;
            init_logging(&config, Some("warn"));
            check_config_cmd::run(&config)?;
        }
    }

    Ok(())
}

async fn run_server(mut config: StatusGateConfig) -> Result<()> {
    info!(
        port = config.server.port,
        bind = %config.server.bind_address,
        environment = ?config.environment,
        "Starting statusgate"
    );
    info!(config = %redacted_view(&config), "Effective configuration");

    let state = GatewayState::from_config(&config).context("Failed to initialise gateway")?;
    config.auth.forget_admin_password();

    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address {}:{}",
                config.server.bind_address, config.server.port
            )
        })?;

    start_server(addr, state).await
}
