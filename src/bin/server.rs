//! Gradebook Server Binary
//!
//! Starts the TCP server for Gradebook.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use clap::Parser;
use gradebook::network::Server;
use gradebook::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// Gradebook Server
#[derive(Parser, Debug)]
#[command(name = "gradebook-server")]
#[command(about = "Academic record server backed by CSV tables")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./gradebook_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:12345")]
    listen: String,

    /// Subject directory address (host:port)
    #[arg(short = 'D', long, default_value = "127.0.0.1:12346")]
    directory: String,

    /// Maximum concurrent connections (0 = unbounded)
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gradebook=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("Gradebook Server v{}", gradebook::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Subject directory: {}", args.directory);

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .directory_addr(&args.directory)
        .max_connections(args.max_connections)
        .build();

    // Open engine
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized successfully");

    let server = match Server::bind(config, engine) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    // Ctrl+C stops the accept loop
    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, initiating shutdown...");
        shutdown.store(true, Ordering::SeqCst);
    }) {
        tracing::warn!("Could not install Ctrl+C handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
