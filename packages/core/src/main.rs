use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::net::TcpListener;

use eldafriend::accounts::AccountService;
use eldafriend::api::{build_router, AppState};
use eldafriend::cli::Cli;
use eldafriend::config::Config;
use eldafriend::db::create_pool;
use eldafriend::error::AppError;
use eldafriend::logging::init_logging;
use eldafriend::medicine::MedicineService;
use eldafriend::metrics::AppMetrics;
use eldafriend::notify::{CountingNotifier, LogNotifier, SharedNotifier, WebhookNotifier};
use eldafriend::repository::Repository;
use eldafriend::scheduler::{run_pending_signup_pruning, DEFAULT_PRUNE_INTERVAL_SECONDS};

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Err(err) = run(cli).await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::from_env().map_err(AppError::Config)?.with_cli(&cli);
    tracing::info!(
        port = config.port,
        relay = config.notify_webhook_url.is_some(),
        utc_offset = %config.schedule_offset,
        "Configuration loaded"
    );

    let pool = create_pool(&config.database_url).await?;
    let repository = Arc::new(Repository::new(pool.clone()));
    let metrics = Arc::new(AppMetrics::new()?);

    let transport: SharedNotifier = match &config.notify_webhook_url {
        Some(url) => {
            tracing::info!("Delivering notifications via relay at {}", url);
            Arc::new(WebhookNotifier::new(url.clone()))
        }
        None => {
            tracing::warn!("NOTIFY_WEBHOOK_URL not set; OTPs will only be logged");
            Arc::new(LogNotifier)
        }
    };
    let notifier: SharedNotifier = Arc::new(CountingNotifier::new(
        transport,
        metrics.notification_failures_total.clone(),
    ));

    let medicines = MedicineService::new(repository.clone(), config.schedule_offset);
    let accounts = AccountService::new(
        repository.clone(),
        notifier,
        config.sender_email.clone(),
        config.password_hash_iterations,
    );

    tokio::spawn(run_pending_signup_pruning(
        accounts.clone(),
        metrics.clone(),
        DEFAULT_PRUNE_INTERVAL_SECONDS,
    ));

    let app = build_router(AppState {
        medicines,
        accounts,
        metrics,
        pool,
    });

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("EldaFriend listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, shutting down");
}
