//! Signal handling for graceful shutdown

use signal_hook_tokio::Signals;
use futures::stream::StreamExt;
use tracing::{info, warn};

/// Wait for SIGTERM or SIGINT and return the signal number.
///
/// If handlers cannot be installed this falls back to ctrl-c only.
pub async fn shutdown_signal() -> Option<i32> {
    let signals = Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ]);

    match signals {
        Ok(mut signals) => {
            let signal = signals.next().await;
            if let Some(signal) = signal {
                info!("Received signal: {}", signal);
            }
            signal
        }
        Err(e) => {
            warn!("Failed to install signal handlers: {}, falling back to ctrl-c", e);
            match tokio::signal::ctrl_c().await {
                Ok(()) => Some(signal_hook::consts::SIGINT),
                Err(e) => {
                    warn!("Failed to listen for ctrl-c: {}", e);
                    None
                }
            }
        }
    }
}
