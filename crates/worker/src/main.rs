//! Background worker: runs the achievement scheduler loop.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hodlboard_achievements::{
    AchievementScheduler, CompletionCoordinator, HttpRewardSink, NoopRewardSink, RewardSink,
    SchedulerConfig,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hodlboard_worker=debug,hodlboard_achievements=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = hodlboard_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    hodlboard_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Reward sink ---
    let rewards: Arc<dyn RewardSink> = match std::env::var("REWARDS_BASE_URL") {
        Ok(base_url) if !base_url.is_empty() => {
            tracing::info!(%base_url, "Reward dispatch enabled");
            Arc::new(HttpRewardSink::new(base_url))
        }
        _ => {
            tracing::info!("REWARDS_BASE_URL not set, reward dispatch is a no-op");
            Arc::new(NoopRewardSink)
        }
    };

    // --- Scheduler ---
    let config = SchedulerConfig::from_env();
    let coordinator = CompletionCoordinator::new(pool.clone(), rewards);
    let scheduler = AchievementScheduler::new(pool, config, coordinator);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
        tracing::info!("Received SIGINT (Ctrl-C), stopping scheduler");
        signal_token.cancel();
    });

    scheduler.run(shutdown).await;

    tracing::info!("Worker stopped");
}
