// Server loop module
// Accepts connections until shutdown, then waits for live connections to finish

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::connection::{accept_connection, ConnectionTracker};
use crate::config::AppState;
use crate::logger;

/// Run the accept loop until `shutdown` changes
///
/// Returns after the listener is closed and every accepted connection has ended.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    tracker: Arc<ConnectionTracker>,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let connection_shutdown = shutdown.clone();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &tracker,
                            connection_shutdown.clone(),
                        );
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = shutdown.changed() => {
                logger::log_info("[Shutdown] No longer accepting connections");
                break;
            }
        }
    }

    drop(listener);

    let live = tracker.active();
    if live > 0 {
        logger::log_info(&format!(
            "[Shutdown] Waiting for {live} connection(s) to finish"
        ));
    }
    tracker.wait_idle().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{create_listener, SignalHandler};
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    struct TestServer {
        addr: SocketAddr,
        signals: SignalHandler,
        tracker: Arc<ConnectionTracker>,
        task: tokio::task::JoinHandle<std::io::Result<()>>,
    }

    fn spawn_server(state: AppState) -> TestServer {
        let listener = create_listener("127.0.0.1:0".parse().unwrap(), 16).unwrap();
        let addr = listener.local_addr().unwrap();
        let signals = SignalHandler::new();
        let tracker = Arc::new(ConnectionTracker::new());
        let task = tokio::spawn(start_server_loop(
            listener,
            Arc::new(state),
            Arc::clone(&tracker),
            signals.subscribe(),
        ));
        TestServer {
            addr,
            signals,
            tracker,
            task,
        }
    }

    async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut buf = String::new();
        stream.read_to_string(&mut buf).await.unwrap();
        buf
    }

    async fn shutdown(server: TestServer) {
        server.signals.trigger();
        tokio::time::timeout(Duration::from_secs(5), server.task)
            .await
            .expect("server stopped")
            .unwrap()
            .unwrap();
        assert_eq!(server.tracker.active(), 0);
    }

    #[tokio::test]
    async fn test_serves_get_and_post() {
        let server = spawn_server(AppState::for_tests());

        let get = roundtrip(
            server.addr,
            "GET /ex4 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(get.starts_with("HTTP/1.1 200 OK"), "{get}");
        assert!(get.ends_with("Recebemos uma requisicao GET no EX4"));

        let body = "nome=Ana&idade=30";
        let post = roundtrip(
            server.addr,
            &format!(
                "POST /ex3 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
                 Content-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{body}",
                body.len()
            ),
        )
        .await;
        assert!(post.starts_with("HTTP/1.1 200 OK"), "{post}");
        assert!(post.ends_with("Dados Recebidos!\nNome: Ana\nIdade: 30"));

        assert_eq!(server.tracker.total(), 2);
        shutdown(server).await;
    }

    #[tokio::test]
    async fn test_redirect_and_errors_over_the_wire() {
        let server = spawn_server(AppState::for_tests());

        let redirect = roundtrip(
            server.addr,
            "GET /redirect HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await
        .to_ascii_lowercase();
        assert!(redirect.starts_with("http/1.1 302 found"), "{redirect}");
        assert!(redirect.contains("location: https://www.google.com\r\n"));

        let missing = roundtrip(
            server.addr,
            "GET /nao-existe HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(missing.starts_with("HTTP/1.1 404 Not Found"), "{missing}");

        let put = roundtrip(
            server.addr,
            "PUT /ex4 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: 0\r\n\r\n",
        )
        .await;
        assert!(put.starts_with("HTTP/1.1 405 Method Not Allowed"), "{put}");

        shutdown(server).await;
    }

    #[tokio::test]
    async fn test_shutdown_closes_idle_keep_alive_connection() {
        let server = spawn_server(AppState::for_tests());

        // Keep-alive connection stays open after its first response
        let mut stream = TcpStream::connect(server.addr).await.unwrap();
        stream
            .write_all(b"GET /ex1 HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut buf = vec![0u8; 1024];
        let n = stream.read(&mut buf).await.unwrap();
        assert!(String::from_utf8_lossy(&buf[..n]).contains("Hello, World!"));
        assert_eq!(server.tracker.active(), 1);

        shutdown(server).await;

        // Server side closed the connection
        let n = stream.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let mut state = AppState::for_tests();
        state.config.performance.max_connections = Some(1);
        let server = spawn_server(state);

        let mut held = TcpStream::connect(server.addr).await.unwrap();
        held.write_all(b"GET /ex1 HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();
        let mut buf = vec![0u8; 1024];
        let n = held.read(&mut buf).await.unwrap();
        assert!(n > 0);

        // Second connection is accepted by the kernel, then dropped by the server
        let mut rejected = TcpStream::connect(server.addr).await.unwrap();
        let _ = rejected
            .write_all(b"GET /ex1 HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await;
        let mut rest = Vec::new();
        let read = rejected.read_to_end(&mut rest).await;
        assert!(read.map_or(true, |n| n == 0));

        drop(held);
        shutdown(server).await;
    }
}
