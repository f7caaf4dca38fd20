use std::fmt;
use std::io;

use tokio::signal;
use tracing::info;

/// Signal that ended the process wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Interrupt => f.write_str("SIGINT"),
            Signal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Wait for SIGINT or SIGTERM.
pub async fn wait_for_signal() -> io::Result<Signal> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;

        let received = tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                Signal::Interrupt
            }
            _ = terminate.recv() => Signal::Terminate,
        };

        info!(signal = %received, "received shutdown signal");
        Ok(received)
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!(signal = %Signal::Interrupt, "received shutdown signal");
        Ok(Signal::Interrupt)
    }
}
