//! OS termination signals for hosts that feed a group from a channel.
//!
//! [`wait_for_shutdown_signal`] resolves on the first of SIGINT, SIGTERM or
//! SIGQUIT (Ctrl-C outside unix) and names the signal. Most callers want
//! [`EventSender::forward_shutdown_signals`](crate::EventSender::forward_shutdown_signals),
//! which turns it into the termination event.

use std::io;

/// Resolves with the name of the first termination signal received.
///
/// Listeners are installed on the call, so signals that arrived earlier are
/// not seen. Fails if the handlers cannot be installed.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Resolves with the name of the first termination signal received.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_reports_which_signal_arrived() {
        let wait = wait_for_shutdown_signal();
        tokio::pin!(wait);
        // First poll installs the listeners.
        assert!(futures::poll!(wait.as_mut()).is_pending());

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .expect("run kill");
        assert!(status.success());

        let name = tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .expect("signal within timeout")
            .expect("listeners installed");
        assert_eq!(name, "SIGTERM");
    }
}
