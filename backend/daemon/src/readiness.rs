//! Readiness signaling to a supervising parent.
//!
//! Implements the systemd notify protocol: a `READY=1` datagram on the
//! socket named by `NOTIFY_SOCKET`. Without a supervisor the notifier is a
//! no-op, so unsupervised runs behave identically minus the signal.

use std::path::PathBuf;

use async_trait::async_trait;
use casd_core::ReadinessNotifier;
use tracing::{debug, info, warn};

pub struct SdNotify {
    socket_path: Option<PathBuf>,
}

impl SdNotify {
    /// Pick up the supervisor socket from the environment, if any.
    pub fn from_env() -> Self {
        Self {
            socket_path: std::env::var_os("NOTIFY_SOCKET").map(PathBuf::from),
        }
    }

    pub fn disabled() -> Self {
        Self { socket_path: None }
    }
}

#[async_trait]
impl ReadinessNotifier for SdNotify {
    async fn notify_ready(&self) {
        let Some(path) = &self.socket_path else {
            debug!("no supervisor notify socket; skipping readiness signal");
            return;
        };
        match send_ready(path).await {
            Ok(()) => info!("readiness signaled to supervisor"),
            Err(e) => warn!("could not signal readiness: {e}"),
        }
    }
}

#[cfg(unix)]
async fn send_ready(path: &std::path::Path) -> std::io::Result<()> {
    let socket = tokio::net::UnixDatagram::unbound()?;
    socket.send_to(b"READY=1", path).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn send_ready(_path: &std::path::Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "notify sockets are unix-only",
    ))
}
