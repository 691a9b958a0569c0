// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)
//
// Other platforms only get Ctrl+C.

use tokio::sync::watch;

use crate::logger;

/// Broadcasts the shutdown request to the accept loop and every connection
pub struct SignalHandler {
    shutdown: watch::Sender<bool>,
}

impl SignalHandler {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self { shutdown }
    }

    /// Receiver that observes a change once shutdown is requested
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Request shutdown. Later calls are no-ops.
    pub fn trigger(&self) {
        self.shutdown.send_if_modified(|requested| {
            let first = !*requested;
            *requested = true;
            first
        });
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a task that triggers shutdown on SIGTERM or SIGINT
#[cfg(unix)]
pub fn start_signal_handler(handler: std::sync::Arc<SignalHandler>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                (Err(e), _) | (_, Err(e)) => {
                    logger::log_error(&format!("Failed to register signal handlers: {e}"));
                    return;
                }
            };

        logger::log_debug(&format!(
            "[Signal] SIGTERM/SIGINT trigger graceful shutdown (pid {})",
            std::process::id()
        ));

        tokio::select! {
            _ = sigterm.recv() => logger::log_info("[Signal] SIGTERM received, shutting down"),
            _ = sigint.recv() => logger::log_info("[Signal] SIGINT received, shutting down"),
        }
        handler.trigger();
    });
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: std::sync::Arc<SignalHandler>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                logger::log_info("[Signal] Ctrl+C received, shutting down");
                handler.trigger();
            }
            Err(e) => logger::log_error(&format!("Failed to listen for Ctrl+C: {e}")),
        }
    });
}
