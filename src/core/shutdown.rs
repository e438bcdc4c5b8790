//! Shutdown coordination for the desk process
//!
//! Ctrl-C (and the usual termination signals on unix) close the open check-in
//! session so the camera is released before the process exits. A second signal
//! exits immediately.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Installs the process signal handlers around the desk
pub struct ShutdownCoordinator;

impl ShutdownCoordinator {
    /// Run `future_fn` with signal handlers installed, handing it the shutdown receiver
    pub async fn guard<F, Fut, R, E>(future_fn: F) -> Result<R, E>
    where
        F: FnOnce(broadcast::Receiver<()>) -> Fut,
        Fut: std::future::Future<Output = Result<R, E>>,
    {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(8);
        setup_signal_handlers(shutdown_tx);
        future_fn(shutdown_rx).await
    }
}

fn on_signal(tx: &broadcast::Sender<()>, counter: &AtomicUsize) {
    let prev = counter.fetch_add(1, Ordering::AcqRel);
    let _ = tx.send(());
    if prev >= 1 {
        log::warn!("Second interrupt received; exiting without closing the session");
        std::process::exit(130);
    }
}

fn setup_signal_handlers(shutdown_tx: broadcast::Sender<()>) {
    let signal_count = Arc::new(AtomicUsize::new(0));

    #[cfg(unix)]
    {
        // Default SIGPIPE so `lifthub-checkin logs | head` exits quietly
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        use tokio::signal::unix::{signal, SignalKind};
        for kind in [SignalKind::terminate(), SignalKind::hangup()] {
            let tx = shutdown_tx.clone();
            let counter = signal_count.clone();
            tokio::spawn(async move {
                if let Ok(mut sig) = signal(kind) {
                    while sig.recv().await.is_some() {
                        on_signal(&tx, &counter);
                    }
                }
            });
        }
    }

    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            on_signal(&shutdown_tx, &signal_count);
        }
    });
}
