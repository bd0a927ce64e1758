//! kycgate daemon: entry point for the verification demo backend.

mod shutdown;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::task::JoinSet;
use tracing::{info, warn};

use kycgate_rpc::{RpcServer, ServerConfig};
use kycgate_store::MemoryStatusStore;
use kycgate_types::SystemClock;
use kycgate_utils::{init_logging, LogFormat};
use kycgate_verification::KycService;
use kycgate_websocket::WebSocketServer;

use crate::shutdown::ShutdownController;

#[derive(Parser)]
#[command(name = "kycgate", about = "Identity verification demo backend")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "KYCGATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Args, Default)]
struct Overrides {
    /// Interface to bind.
    #[arg(long, env = "KYCGATE_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// HTTP API port.
    #[arg(long, env = "KYCGATE_PORT")]
    port: Option<u16>,

    /// Enable the WebSocket status feed.
    #[arg(long, env = "KYCGATE_ENABLE_WEBSOCKET")]
    websocket: bool,

    /// WebSocket port.
    #[arg(long, env = "KYCGATE_WS_PORT")]
    websocket_port: Option<u16>,

    /// User assumed when a request carries no X-User-Id header.
    #[arg(long, env = "KYCGATE_DEFAULT_USER")]
    default_user: Option<String>,

    /// Shared secret for webhook signatures.
    #[arg(long, env = "KYCGATE_WEBHOOK_SECRET", hide_env_values = true)]
    webhook_secret: Option<String>,

    /// Header carrying the webhook signature.
    #[arg(long, env = "KYCGATE_SIGNATURE_HEADER")]
    signature_header: Option<String>,

    /// Expose the simulate endpoint. Never in production.
    #[arg(long, env = "KYCGATE_ENABLE_SIMULATION")]
    enable_simulation: bool,

    /// Origin allowed by CORS.
    #[arg(long, env = "KYCGATE_CORS_ORIGIN")]
    cors_origin: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "KYCGATE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "KYCGATE_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Overrides {
    fn apply(self, base: ServerConfig) -> ServerConfig {
        ServerConfig {
            bind_address: self.bind_address.unwrap_or(base.bind_address),
            port: self.port.unwrap_or(base.port),
            enable_websocket: self.websocket || base.enable_websocket,
            websocket_port: self.websocket_port.unwrap_or(base.websocket_port),
            default_user: self.default_user.unwrap_or(base.default_user),
            webhook_secret: self.webhook_secret.or(base.webhook_secret),
            signature_header: self.signature_header.unwrap_or(base.signature_header),
            enable_simulation: self.enable_simulation || base.enable_simulation,
            cors_origin: self.cors_origin.unwrap_or(base.cors_origin),
            log_format: self.log_format.unwrap_or(base.log_format),
            log_level: self.log_level.unwrap_or(base.log_level),
        }
    }
}

#[derive(clap::Subcommand, Clone, Copy)]
enum Command {
    /// Run the servers (default).
    Run,
    /// Print the effective configuration as TOML and exit.
    PrintConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => ServerConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    let config = cli.overrides.apply(base);

    match cli.command.unwrap_or(Command::Run) {
        Command::PrintConfig => println!("{}", config.to_toml_string()?),
        Command::Run => {
            init_logging(config.log_format, &config.log_level);
            if let Some(path) = &cli.config {
                info!("loaded config from {}", path.display());
            }
            run(config).await?;
        }
    }
    Ok(())
}

async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let service = KycService::new(Arc::new(MemoryStatusStore::new()), Arc::new(SystemClock));
    let shutdown = ShutdownController::new();
    let rpc = RpcServer::new(config.clone(), service.clone()).context("invalid server config")?;

    info!(
        "starting kycgate (HTTP:{}, WS:{})",
        config.http_addr(),
        if config.enable_websocket {
            config.websocket_addr()
        } else {
            "off".into()
        },
    );
    if config.enable_simulation {
        warn!("simulation endpoint enabled, do not run this configuration in production");
    }

    let mut servers = JoinSet::new();
    let rpc_stop = shutdown.triggered();
    servers.spawn(async move { rpc.start(rpc_stop).await.map_err(anyhow::Error::from) });

    if config.enable_websocket {
        let ws = WebSocketServer::new(service.feed().clone());
        let addr = config.websocket_addr();
        let ws_stop = shutdown.triggered();
        servers.spawn(async move { ws.start(&addr, ws_stop).await.map_err(anyhow::Error::from) });
    }

    tokio::select! {
        _ = shutdown.wait_for_signal() => {}
        Some(result) = servers.join_next() => {
            // A server stopped on its own, most likely a bind failure.
            shutdown.shutdown();
            result??;
        }
    }

    while let Some(result) = servers.join_next().await {
        result??;
    }
    info!("kycgate exited cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_file_values() {
        let base = ServerConfig {
            port: 4000,
            enable_simulation: true,
            webhook_secret: Some("from_file".into()),
            ..Default::default()
        };
        let overrides = Overrides {
            port: Some(5000),
            webhook_secret: Some("from_env".into()),
            log_format: Some(LogFormat::Json),
            ..Default::default()
        };
        let config = overrides.apply(base);
        assert_eq!(config.port, 5000);
        assert!(config.enable_simulation);
        assert_eq!(config.webhook_secret.as_deref(), Some("from_env"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.websocket_port, 3002);
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "kycgate",
            "--port",
            "8080",
            "--websocket",
            "--log-format",
            "json",
            "print-config",
        ])
        .unwrap();
        assert_eq!(cli.overrides.port, Some(8080));
        assert!(cli.overrides.websocket);
        assert_eq!(cli.overrides.log_format, Some(LogFormat::Json));
        assert!(matches!(cli.command, Some(Command::PrintConfig)));
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["kycgate", "--log-format", "xml"]).is_err());
    }
}
