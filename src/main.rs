//! Subscription Gate server.
//!
//! Starts the HTTP API, the expiry sweeper and, when enabled, the Telegram
//! update poller. All three stop together on Ctrl+C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subscription_gate::adapters::http::{api_router, with_http_layers};
use subscription_gate::adapters::postgres::run_migrations;
use subscription_gate::adapters::scheduler::{ExpirySweeper, ExpirySweeperConfig};
use subscription_gate::adapters::telegram::{TelegramBotClient, UpdatePoller, UpdatePollerConfig};
use subscription_gate::config::{AppConfig, LogFormat, ServerConfig};
use subscription_gate::context::{AppContext, GateSettings, Ports};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        port = config.server.port,
        group_id = config.telegram.group_id,
        plan_days = config.subscription.days,
        polling = config.telegram.polling_enabled,
        "subscription-gate starting"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let bot = TelegramBotClient::from_config(&config.telegram);
    let ports = Ports::production(pool.clone(), &config, bot.clone());
    let context = AppContext::new(ports, GateSettings::from_config(&config)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = Vec::new();

    let sweeper = ExpirySweeper::new(
        context.sweeper.clone(),
        ExpirySweeperConfig::default()
            .with_interval(Duration::from_secs(config.subscription.sweep_interval_secs)),
    );
    let rx = shutdown_rx.clone();
    tasks.push(tokio::spawn(async move { sweeper.run(rx).await }));

    if config.telegram.polling_enabled {
        let poller = UpdatePoller::new(
            bot,
            Arc::clone(&context.bot),
            UpdatePollerConfig {
                poll_timeout_secs: config.telegram.poll_timeout_secs,
                ..UpdatePollerConfig::default()
            },
        );
        let rx = shutdown_rx.clone();
        tasks.push(tokio::spawn(async move { poller.run(rx).await }));
    }

    let app = with_http_layers(api_router(context.api), &config.server);
    let listener = TcpListener::bind(config.server.socket_addr()?).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Receivers may already be gone if a task exited early
    let _ = shutdown_tx.send(true);
    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Background task panicked");
        }
    }
    pool.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match server.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
