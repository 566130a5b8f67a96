//! Emissary CLI and HTTP entry point.
//!
//! Binary name: `emissary`
//!
//! Parses CLI arguments, initializes tracing and the orchestrator, then
//! answers one question (`ask`) or serves the VAC endpoints (`serve`).

mod cli;
mod conversation;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use emissary_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "emissary", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(cli.otel).map_err(|e| anyhow::anyhow!(e))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Ask {
            vector_name,
            question,
            instructions,
            trace_id,
        } => {
            cli::ask::ask(
                &state,
                &vector_name,
                &question,
                instructions,
                trace_id,
                cli.json,
            )
            .await?;
        }

        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config().server.host.clone());
            let port = port.unwrap_or(state.config().server.port);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, vacs = state.config().vac.len(), "Listening");

            println!(
                "  {} Emissary listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
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
                tracing::error!("Failed to install SIGTERM handler: {e}");
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

    tracing::info!("Shutdown signal received");
}
