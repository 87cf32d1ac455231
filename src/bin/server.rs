use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use wcst::env_config;
use wcst::server::{create_router, SessionStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let defaults = match env_config::experiment_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let max_sessions = env_config::max_sessions();
    println!(
        "Starting wcst API server (schedule={}, trials_per_rule={}, transition_trials={}, \
         max_counted_trials={}, max_sessions={})...",
        defaults.schedule.as_str(),
        defaults.trials_per_rule,
        defaults.transition_trials,
        defaults.max_counted_trials,
        max_sessions
    );

    let store = SessionStore::with_max_sessions(defaults, max_sessions);
    let app = create_router(Arc::new(store));

    let port = env_config::server_port();
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind port {}: {}", port, e);
            std::process::exit(1);
        }
    };
    println!("Server is running on port {}. Press Ctrl+C to stop.", port);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }

    println!("\nStopping server...");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("Failed to install CTRL+C signal handler: {}", e);
    }
}
