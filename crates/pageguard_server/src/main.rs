//! Headless API server entrypoint.

use chrono::Utc;
use pageguard_server::{config::Config, db::Database, serve_router, AppState, DEFAULT_PORT};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    sweep: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" => flags.help = true,
            "--sweep" => flags.sweep = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pageguard=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();

    if cli_flags.sweep {
        return run_sweep(&config);
    }

    let database = Database::with_lock_ttl(&config.db_path, config.lock_ttl())?;
    tracing::info!(
        "Page locks expire after {}s; {} allowed referer host(s)",
        config.lock_ttl().num_seconds(),
        config.allowed_hosts.len()
    );
    if config.allowed_hosts.is_empty() {
        tracing::warn!("ALLOWED_HOSTS is empty; every request with a referer will be denied");
    }

    let state = AppState::new(config.clone(), database);

    let allow_public = pageguard_server::config::env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }

    let bind_addr = pageguard_server::resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("pageguard running at http://{}", actual_addr);

    serve_router(listener, state, allow_public, shutdown_signal()).await?;
    tracing::info!("Server stopped");

    Ok(())
}

fn run_sweep(config: &Config) -> anyhow::Result<()> {
    let database = Database::with_lock_ttl(&config.db_path, config.lock_ttl())?;
    let removed = database.locks.sweep_expired(Utc::now())?;
    if removed == 0 {
        println!("No expired page locks");
    } else {
        println!("Removed {} expired page lock(s)", removed);
    }
    Ok(())
}

fn print_help() {
    println!("pageguard server\n");
    println!("Usage: pageguard [OPTIONS]\n");
    println!("Options:");
    println!("  --sweep           Delete expired page locks and exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DB_PATH           Database path (default: ~/.cache/pageguard/db)");
    println!(
        "  PORT              Server port (default: {})",
        DEFAULT_PORT
    );
    println!("  LOCK_TTL_SECS     Page lock lifetime in seconds (default: 300)");
    println!("  ALLOWED_HOSTS     Comma-separated referer hosts to admit");
    println!("  BYPASS_PATTERNS   Comma-separated path patterns admitted without a referer");
    println!("  REFERER_PATTERNS  Comma-separated referer paths required on credential routes");
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin");
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
