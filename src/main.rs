use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use trovewatch::orchestration::{run_periodically, Schedule};
use trovewatch::{
    config::Config, db::init_db, ChainClients, Monitor, MonitorSettings, PushoverNotifier,
    RpcChain, RunOutcome, SqliteSnapshotStore,
};

/// Interval used by `--watch` when `WATCH_INTERVAL_SECS` is not set.
const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let force_notification = args.iter().any(|a| a == "--force-notification");
    let watch = args.iter().any(|a| a == "--watch");

    if let Err(e) = run(force_notification, watch).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(force_notification: bool, watch: bool) -> anyhow::Result<()> {
    let config = Config::from_env().context("configuration error")?;

    tracing::info!(
        position = %config.position,
        min_collateral_ratio = %config.min_collateral_ratio.as_percent(),
        max_collateral_ratio = %config.max_collateral_ratio.as_percent(),
        eth_redemption_buffer = %config.eth_redemption_buffer,
        database_path = %config.database_path,
        "Loaded configuration"
    );

    let pool = init_db(&config.database_path)
        .await
        .with_context(|| format!("failed to open snapshot database {}", config.database_path))?;
    let store = Arc::new(SqliteSnapshotStore::new(pool));

    let chain = Arc::new(RpcChain::new(config.rpc_url.clone(), config.contracts.clone()));
    let notifier = Arc::new(PushoverNotifier::new(
        config.pushover_token.clone(),
        config.pushover_user.clone(),
    ));
    let monitor = Monitor::new(
        MonitorSettings::from(&config),
        ChainClients::shared(chain),
        store,
        notifier,
    );

    let interval = config
        .watch_interval
        .or(watch.then_some(DEFAULT_WATCH_INTERVAL));

    match interval {
        Some(interval) => {
            tracing::info!(interval_secs = interval.as_secs(), "Watching trove");
            let schedule = Schedule {
                interval,
                force_first: force_notification,
                max_runs: None,
            };
            let shutdown = async {
                tokio::signal::ctrl_c().await.ok();
            };
            run_periodically(&monitor, schedule, shutdown).await;
        }
        None => {
            if let RunOutcome::Aborted { stage, error, .. } =
                monitor.run_once(force_notification).await
            {
                anyhow::bail!("run aborted at {}: {}", stage, error);
            }
        }
    }

    Ok(())
}
