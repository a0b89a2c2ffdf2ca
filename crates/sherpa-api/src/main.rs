//! Sherpa CLI and HTTP entry point.
//!
//! Binary name: `sherpa`
//!
//! Parses CLI arguments, loads configuration and wires the tour guide, then
//! dispatches to the command handler or starts the HTTP server.

mod cli;
mod http;
mod state;

use std::time::Duration;

use clap::Parser;

use sherpa_core::session::SessionStore;
use sherpa_infra::config::{load_global_config, resolve_data_dir};
use sherpa_observe::tracing_setup::{init_tracing, shutdown_tracing};
use sherpa_types::tour::CityHint;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `.env` is optional; real environment variables win.
    let _ = dotenvy::dotenv();

    init_tracing(cli.log_filter(), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Status => {
            let data_dir = resolve_data_dir();
            let config = load_global_config(&data_dir).await;
            cli::status::status(&data_dir, &config, cli.json)?;
        }

        Commands::Ask {
            query,
            city,
            lat,
            lng,
            first,
            session,
        } => {
            let state = AppState::init().await?;
            let city = CityHint {
                name: city,
                latitude: lat,
                longitude: lng,
            };
            cli::ask::ask(&state, query, city, first, &session, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let state = AppState::init().await?;
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);

            let idle = Duration::from_secs(state.config.server.session_idle_secs);
            let sweeper = tokio::spawn(sweep_idle_sessions(
                state.guide.sessions().clone(),
                idle,
            ));

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Sherpa listening on {}",
                    console::style("🧭").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            sweeper.abort();
            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }
    }

    Ok(())
}

/// Evict idle sessions periodically.
async fn sweep_idle_sessions(sessions: SessionStore, max_idle: Duration) {
    let period = (max_idle / 4).max(Duration::from_secs(30));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        sessions.evict_idle(max_idle);
    }
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
