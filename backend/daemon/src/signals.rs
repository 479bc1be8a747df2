//! Signal-driven process supervision.
//!
//! There is no graceful-shutdown path in the bootstrap core; a termination
//! signal exits the process directly, and the listening socket is reclaimed
//! at process exit.

use casd_core::ProcessManager;
use tracing::info;

pub struct SignalSupervisor;

impl ProcessManager for SignalSupervisor {
    fn start(&self) {
        tokio::spawn(async {
            wait_for_termination().await;
            info!("termination signal received; exiting");
            std::process::exit(0);
        });
    }
}

#[cfg(unix)]
async fn wait_for_termination() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            tracing::warn!("could not install SIGTERM handler: {e}");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = term.recv() => {}
        _ = tokio::signal::ctrl_c() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    let _ = tokio::signal::ctrl_c().await;
}
