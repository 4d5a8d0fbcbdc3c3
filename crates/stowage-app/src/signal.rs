//! Resolves when the process is asked to stop.

use tracing::{error, info, warn};

/// Wait for SIGTERM or SIGINT.
///
/// Falls back to whichever handler could be registered, then to `ctrl_c`.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => info!("received SIGTERM"),
                _ = sigint.recv() => info!("received SIGINT"),
            }
        }
        (Ok(mut sigterm), Err(err)) => {
            warn!(error = %err, "could not register SIGINT handler; waiting for SIGTERM only");
            sigterm.recv().await;
            info!("received SIGTERM");
        }
        (Err(err), Ok(mut sigint)) => {
            warn!(error = %err, "could not register SIGTERM handler; waiting for SIGINT only");
            sigint.recv().await;
            info!("received SIGINT");
        }
        (Err(err), Err(_)) => {
            error!(error = %err, "could not register signal handlers; using ctrl_c fallback");
            ctrl_c().await;
        }
    }
}

/// Wait for Ctrl+C.
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C"),
        Err(err) => {
            error!(error = %err, "failed to listen for Ctrl+C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
