use crate::types::{Port, ProbeResult};
use std::io;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time;
use tracing::{debug, trace};

/// Check a single `host:port` with one TCP connect attempt.
///
/// - Name resolution and the handshake both count against `timeout`.
/// - On success the stream is shut down and dropped before returning.
/// - Any failure (refused, timed out, unreachable, DNS, port out of range) is
///   reported as closed; the reason only reaches the debug log.
pub async fn probe(host: &str, port: Port, timeout: Duration) -> ProbeResult {
    let Ok(port_u16) = u16::try_from(port) else {
        debug!(host, port, "port out of range, reporting closed");
        return ProbeResult::closed(port);
    };

    match connect(host, port_u16, timeout).await {
        Ok(mut stream) => {
            if let Err(e) = stream.shutdown().await {
                trace!(host, port, error = %e, "shutdown after connect failed");
            }
            debug!(host, port, "open");
            ProbeResult::open(port)
        }
        Err(e) => {
            debug!(host, port, error = %e, "closed");
            ProbeResult::closed(port)
        }
    }
}

async fn connect(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    time::timeout(timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::time::Instant;

    const TIMEOUT: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn listening_port_is_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::from(listener.local_addr().unwrap().port());

        let result = probe("127.0.0.1", port, TIMEOUT).await;
        assert_eq!(result, ProbeResult::open(port));
    }

    #[tokio::test]
    async fn connection_is_released_after_probe() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::from(listener.local_addr().unwrap().port());

        assert!(probe("127.0.0.1", port, TIMEOUT).await.is_open);

        // The queued connection must already be closed by the prober.
        let (mut accepted, _) = time::timeout(TIMEOUT, listener.accept())
            .await
            .unwrap()
            .unwrap();
        let mut buf = [0u8; 16];
        let n = time::timeout(TIMEOUT, accepted.read(&mut buf))
            .await
            .unwrap()
            .unwrap_or(0);
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn unused_port_is_closed_within_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::from(listener.local_addr().unwrap().port());
        drop(listener);

        let start = Instant::now();
        let result = probe("127.0.0.1", port, TIMEOUT).await;
        assert!(!result.is_open);
        assert!(start.elapsed() < TIMEOUT + Duration::from_millis(250));
    }

    #[tokio::test]
    async fn out_of_range_ports_are_closed() {
        for port in [-1, 0, 65_536, 70_000] {
            let result = probe("127.0.0.1", port, TIMEOUT).await;
            assert_eq!(result, ProbeResult::closed(port));
        }
    }

    #[tokio::test]
    async fn unresolvable_host_is_closed() {
        let start = Instant::now();
        let result = probe("no-such-host.invalid", 80, TIMEOUT).await;
        assert!(!result.is_open);
        assert!(start.elapsed() < TIMEOUT + Duration::from_millis(250));
    }
}
