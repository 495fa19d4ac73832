use anyhow::Result;
use openprovider_webhook::config::GROUP_NAME_ENV;
use openprovider_webhook::openprovider::ZoneClient;
use openprovider_webhook::solver::DynSolver;
use openprovider_webhook::{Config, OpenproviderSolver, SharedConfig, Solver};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let config_file = std::env::args().nth(1);
    let group_name = std::env::var(GROUP_NAME_ENV).unwrap_or_default();
    let config = config_init(config_file, &group_name)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let zones = ZoneClient::new(&config.provider_base_url, config.provider_timeout)?;
    let mut solver = OpenproviderSolver::new(zones);
    solver.initialize(&config.cluster_config()?, shutdown_rx.clone())?;
    let solver: DynSolver = Arc::new(solver);

    tracing::info!(
        "API listening on {} for {}/{}",
        &config.api_bind_addr,
        &config.group_name,
        solver.name()
    );
    let mut api_handle = tokio::spawn(openprovider_webhook::api::new(
        config.clone(),
        solver,
        shutdown_rx,
    ));

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
            let _ = shutdown_tx.send(true);
            api_handle.await??;
        },
        api_res = &mut api_handle => {
            api_res??;
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openprovider_webhook=info,tower_http=info".into()),
        )
        .init();
}

fn config_init(config_file: Option<String>, group_name: &str) -> Result<SharedConfig> {
    let config = match config_file {
        None => Config::default(),
        Some(config_file) => {
            tracing::debug!("loaded config from {config_file}");
            Config::try_from_file(&config_file)?
        }
    };
    Ok(Arc::new(config.with_group_name(group_name)?))
}
