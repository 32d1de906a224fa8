//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook_tokio::Signals;
use tracing::info;

/// Wait for a shutdown signal (SIGTERM, SIGINT) and return its number.
///
/// Fails only when the signal handler cannot be registered.
pub async fn shutdown_signal() -> std::io::Result<i32> {
    let mut signals = Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ])?;
    let handle = signals.handle();

    let received = signals.next().await.unwrap_or(signal_hook::consts::SIGTERM);
    info!("Received signal: {}", received);
    handle.close();

    Ok(received)
}
