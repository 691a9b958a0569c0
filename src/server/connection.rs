// Connection handling module
// Accepts TCP connections, serves them with hyper and tracks how many are live

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::sync::{watch, Notify};

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Counts live connections so shutdown can wait for them
#[derive(Debug, Default)]
pub struct ConnectionTracker {
    active: AtomicUsize,
    total: AtomicUsize,
    idle: Notify,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot, `None` when `limit` connections are already live
    fn try_acquire(self: &Arc<Self>, limit: Option<usize>) -> Option<ConnectionGuard> {
        // Increment first, then check the limit, so concurrent accepts cannot overshoot
        let prev_count = self.active.fetch_add(1, Ordering::SeqCst);
        if limit.is_some_and(|max| prev_count >= max) {
            self.release();
            return None;
        }
        self.total.fetch_add(1, Ordering::Relaxed);
        Some(ConnectionGuard {
            tracker: Arc::clone(self),
        })
    }

    fn release(&self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Connections accepted since startup
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Resolve once no connection is live
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.idle.notified();
            if self.active() == 0 {
                return;
            }
            idle.await;
        }
    }
}

/// Releases its slot when the connection task ends, even on panic
pub struct ConnectionGuard {
    tracker: Arc<ConnectionTracker>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.tracker.release();
    }
}

/// Accept a connection: enforce the connection limit, then serve it in its own task.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    tracker: &Arc<ConnectionTracker>,
    shutdown: watch::Receiver<bool>,
) {
    let limit = state
        .config
        .performance
        .max_connections
        .map(|max| usize::try_from(max).unwrap_or(usize::MAX));

    let Some(guard) = tracker.try_acquire(limit) else {
        logger::log_warning(&format!(
            "Max connections reached: {}/{}. Connection from {peer_addr} rejected.",
            tracker.active(),
            limit.unwrap_or_default()
        ));
        drop(stream);
        return;
    };

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state), guard, shutdown);
}

/// Serve a single connection in a spawned task.
///
/// The connection is bounded by the configured timeout. When shutdown is signalled the
/// in-flight request is allowed to finish, then the connection is closed.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    guard: ConnectionGuard,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        let _guard = guard;
        let io = TokioIo::new(stream);
        let timeout_duration = state.config.connection_timeout();

        let mut builder = http1::Builder::new();
        builder.keep_alive(state.config.performance.keep_alive);

        let service_state = Arc::clone(&state);
        let service = service_fn(move |req| {
            handler::handle_request(req, Arc::clone(&service_state), peer_addr)
        });
        let conn = builder.serve_connection(io, service);
        tokio::pin!(conn);

        let served = tokio::time::timeout(timeout_duration, async {
            tokio::select! {
                result = conn.as_mut() => result,
                _ = shutdown.changed() => {
                    conn.as_mut().graceful_shutdown();
                    conn.as_mut().await
                }
            }
        })
        .await;

        match served {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {} seconds",
                timeout_duration.as_secs()
            )),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_limit_enforced() {
        let tracker = Arc::new(ConnectionTracker::new());
        let first = tracker.try_acquire(Some(2)).unwrap();
        let second = tracker.try_acquire(Some(2)).unwrap();
        assert!(tracker.try_acquire(Some(2)).is_none());
        assert_eq!(tracker.active(), 2);

        drop(first);
        assert_eq!(tracker.active(), 1);
        let third = tracker.try_acquire(Some(2)).unwrap();
        assert_eq!(tracker.total(), 3);

        drop(second);
        drop(third);
        assert_eq!(tracker.active(), 0);
    }

    #[test]
    fn test_unlimited() {
        let tracker = Arc::new(ConnectionTracker::new());
        let guards: Vec<_> = (0..50).filter_map(|_| tracker.try_acquire(None)).collect();
        assert_eq!(guards.len(), 50);
    }

    #[tokio::test]
    async fn test_wait_idle_waits_for_release() {
        let tracker = Arc::new(ConnectionTracker::new());
        let guard = tracker.try_acquire(None).unwrap();

        let waiter = tokio::spawn({
            let tracker = Arc::clone(&tracker);
            async move { tracker.wait_idle().await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait_idle resolved")
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_idle_when_already_idle() {
        let tracker = ConnectionTracker::new();
        tokio::time::timeout(Duration::from_millis(100), tracker.wait_idle())
            .await
            .expect("no connections to wait for");
    }
}
