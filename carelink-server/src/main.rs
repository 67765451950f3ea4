use anyhow::Result;
use clap::Parser;
use colored::*;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use carelink_server::{create_app, CarelinkServer, ServerConfig};

/// CareLink Engine HTTP Server
#[derive(Parser, Debug)]
#[command(name = "carelink-server")]
#[command(about = "Loyalty, wallet and healthcare-benefit API server")]
struct Args {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(args.verbose);

    info!("{}", "Starting CareLink Engine HTTP Server".bright_cyan());
    info!("Version: {}", env!("CARGO_PKG_VERSION").bright_white());
    info!(
        "Bind address: {}",
        format!("{}:{}", args.host, args.port).bright_yellow()
    );

    let config = ServerConfig::from_env()?;
    let server = CarelinkServer::new(config).await?;
    let app = create_app(server);

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;

    info!(
        "{}",
        format!(
            "CareLink Engine server running on http://{}:{}",
            args.host, args.port
        )
        .bright_green()
    );
    info!(
        "{}",
        format!(
            "Health check available at: http://{}:{}/health",
            args.host, args.port
        )
        .bright_blue()
    );
    info!(
        "{}",
        format!("API v1 available at: http://{}:{}/api/v1", args.host, args.port).bright_blue()
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_directives = if verbose {
        "carelink_server=debug,benefit_engine=debug,tower_http=debug,sqlx=info"
    } else {
        "carelink_server=info,benefit_engine=info,tower_http=info,sqlx=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives.into());

    let is_development =
        std::env::var("CARELINK_ENV").unwrap_or_else(|_| "development".to_string()) == "development";

    if is_development {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .init();
    } else {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_ansi(false).json())
            .init();
    }
}
