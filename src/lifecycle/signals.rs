//! OS signal handling.
//!
//! - SIGINT / SIGTERM: graceful shutdown
//! - SIGHUP: reload the server list, keep running

use tokio::sync::mpsc;

use crate::config::ReloadEvent;
use crate::lifecycle::shutdown::Shutdown;

/// Translate OS signals into shutdown and reload events.
///
/// Returns after triggering shutdown.
pub async fn listen(shutdown: Shutdown, reload_tx: mpsc::UnboundedSender<ReloadEvent>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::hangup()), signal(SignalKind::terminate())) {
            (Ok(mut hangup), Ok(mut terminate)) => loop {
                tokio::select! {
                    _ = hangup.recv() => {
                        tracing::info!("SIGHUP received, requesting server list reload");
                        let _ = reload_tx.send(ReloadEvent::Signal);
                    }
                    _ = terminate.recv() => {
                        tracing::info!("SIGTERM received");
                        break;
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("SIGINT received");
                        break;
                    }
                }
            },
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Failed to install unix signal handlers, Ctrl+C only");
                wait_for_ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = &reload_tx;
        wait_for_ctrl_c().await;
    }

    shutdown.trigger();
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
