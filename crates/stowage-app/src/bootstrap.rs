use std::env;
use std::future::Future;
use std::time::Duration;

use stowage_config::Config;
use stowage_fsops::CopyEngine;
use stowage_runtime::DedupCache;
use stowage_telemetry::{LogFormat, LoggingConfig, build_sha};
use stowage_torrent_qbit::QbClient;
use tokio::runtime::Builder;
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::reconciler::Reconciler;
use crate::signal::wait_for_signal;

const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// How long shutdown waits for an in-flight blocking copy before the process exits.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Drive `future` on a multi-threaded runtime, then shut the runtime down.
///
/// Blocking tasks still running after `future` resolves (a copy cut short by a signal)
/// get `grace` to finish and are abandoned after that. Partial copies are redone on
/// the next start because their ids were never recorded.
///
/// # Errors
///
/// Returns [`AppError::Runtime`] if the runtime cannot be built, otherwise the result
/// of `future`.
pub fn run_on_runtime<Fut>(future: Fut, grace: Duration) -> AppResult<()>
where
    Fut: Future<Output = AppResult<()>>,
{
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::runtime("runtime.build", err))?;
    let result = runtime.block_on(future);
    runtime.shutdown_timeout(grace);
    result
}

/// Entry point for the Stowage boot sequence.
///
/// Installs logging, loads configuration from the environment, then reconciles until
/// SIGTERM/SIGINT.
///
/// # Errors
///
/// Returns an error if logging, configuration, the dedup cache, or the qBittorrent
/// login fails during startup.
pub async fn run_app() -> AppResult<()> {
    let logging = LoggingConfig {
        format: LogFormat::from_setting(env::var(ENV_LOG_FORMAT).ok().as_deref()),
        ..LoggingConfig::default()
    };
    stowage_telemetry::init_logging(&logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    info!(build_sha = build_sha(), "Stowage starting");

    let result = match Config::from_env() {
        Ok(config) => run_app_with(config, wait_for_signal()).await,
        Err(err) => Err(AppError::config("config.from_env", err)),
    };
    if let Err(err) = &result {
        error!(error = ?err, "Stowage startup failed");
    }
    result
}

/// Boot sequence driven by an already-loaded configuration and a shutdown future.
///
/// Loads the dedup cache, logs in, and runs the reconciler until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the dedup cache cannot be loaded or the qBittorrent login fails.
pub async fn run_app_with<F>(config: Config, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()>,
{
    let cache = DedupCache::load(&config.cache_path)
        .map_err(|err| AppError::cache("dedup_cache.load", err))?;

    let client =
        QbClient::new(&config).map_err(|err| AppError::torrent("qbit_client.new", err))?;
    client
        .authenticate()
        .await
        .map_err(|err| AppError::torrent("qbit_client.authenticate", err))?;

    for (category, destination) in config.categories.iter() {
        info!(category, destination = %destination.display(), "category mapped");
    }

    let mut reconciler = Reconciler::new(
        client,
        config.categories,
        cache,
        CopyEngine::new(),
        config.poll_interval,
    );
    reconciler.run(shutdown).await;

    info!("Stowage stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn shutdown_does_not_wait_for_a_stuck_blocking_task() -> anyhow::Result<()> {
        let started = Instant::now();

        run_on_runtime(
            async {
                let _stuck =
                    tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(30)));
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(())
            },
            Duration::from_millis(100),
        )?;

        assert!(started.elapsed() < Duration::from_secs(10));
        Ok(())
    }

    #[test]
    fn future_error_is_returned_after_shutdown() {
        let result = run_on_runtime(
            async {
                Err(AppError::runtime(
                    "runtime.test",
                    std::io::Error::other("boom"),
                ))
            },
            Duration::from_millis(100),
        );

        assert!(matches!(
            result,
            Err(AppError::Runtime {
                operation: "runtime.test",
                ..
            })
        ));
    }
}
