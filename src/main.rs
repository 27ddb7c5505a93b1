#![cfg_attr(not(test), deny(clippy::panic))]

use clap::Parser;
use std::net::SocketAddr;
use world_live_server::{config, logging, websocket};

/// World Live Server -- real-time chat and entity-state channels for a
/// multi-user virtual-world platform
#[derive(Parser, Debug)]
#[command(name = "world-live-server")]
#[command(about = "Real-time WebSocket channel server for a multi-user virtual world")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines and pre-deployment checks.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    /// Useful for debugging configuration loading from multiple sources.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from config.json if present; otherwise use code defaults.
    let cfg = config::load();

    if cli.print_config {
        let json = serde_json::to_string_pretty(&cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let validation_result = config::validate_config_security(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!("  Broadcast period: {} ms", cfg.broadcast.period_ms);
                println!("  Max message size: {} bytes", cfg.server.max_message_size);
                println!("  Outbound queue capacity: {}", cfg.server.queue_capacity);
                println!("  CORS origins: {}", cfg.security.cors_origins);
                println!("  Directory entries: {}", cfg.directory.len());
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result.map_err(|e| anyhow::anyhow!("Invalid configuration:\n{e}"))?;

    logging::init_with_config(&cfg.logging);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    websocket::run_server(addr, cfg).await
}
