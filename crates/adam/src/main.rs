mod cli;
mod error;

use std::collections::BTreeMap;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use adam_core::{Controller, GatewayConfig, Reading, Thermostat};

use crate::cli::Cli;
use crate::error::DaemonError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), DaemonError> {
    let config = match cli.config.as_deref() {
        Some(path) => adam_config::load_config_from(path)?,
        None => adam_config::load_config()?,
    }
    .into_gateway_config()?;

    if cli.once {
        let controller = Controller::connect(config).await?;
        return print_once(&controller).await;
    }

    let Some(controller) = connect_with_retry(config, Duration::from_secs(cli.retry_delay)).await?
    else {
        return Ok(());
    };
    poll(&controller).await
}

/// Connect, retrying while the gateway reports not ready.
///
/// Returns `None` if interrupted with Ctrl-C before a connection was made.
async fn connect_with_retry(
    config: GatewayConfig,
    delay: Duration,
) -> Result<Option<Controller>, DaemonError> {
    loop {
        match Controller::connect(config.clone()).await {
            Ok(controller) => return Ok(Some(controller)),
            Err(e) if e.is_not_ready() => {
                warn!(error = %e, retry_in = ?delay, "gateway not ready");
            }
            Err(e) => return Err(e.into()),
        }

        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            _ = tokio::signal::ctrl_c() => return Ok(None),
        }
    }
}

async fn print_once(controller: &Controller) -> Result<(), DaemonError> {
    controller.register_all().await?;
    let store = controller.store();
    store.refresh(true).await;

    let readings: BTreeMap<String, Reading> = store
        .registered()
        .into_iter()
        .map(|id| {
            let reading = store.get_data(&id);
            (id, reading)
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&readings)?);
    Ok(())
}

async fn poll(controller: &Controller) -> Result<(), DaemonError> {
    let devices = controller.register_all().await?;
    let thermostats = controller.thermostats(&devices);
    let store = controller.store();
    let mut refreshed = store.subscribe();

    let cancel = CancellationToken::new();
    let handle = controller.spawn_polling(cancel.clone());
    info!(
        interval = ?store.scan_interval(),
        thermostats = thermostats.len(),
        "polling gateway"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = refreshed.changed() => {
                if changed.is_err() {
                    break;
                }
                log_thermostats(&thermostats);
            }
        }
    }

    cancel.cancel();
    if let Err(e) = handle.await {
        warn!(error = %e, "polling task ended abnormally");
    }
    info!("stopped");
    Ok(())
}

fn log_thermostats(thermostats: &[Thermostat]) {
    for t in thermostats {
        if t.is_available() {
            info!(
                name = t.name(),
                current = ?t.current_temperature(),
                target = ?t.target_temperature(),
                preset = ?t.preset(),
                schedule = ?t.selected_schedule(),
                "thermostat"
            );
        } else {
            debug!(name = t.name(), "thermostat unavailable");
        }
    }
}
