use std::time::Duration;

use async_trait::async_trait;
use pawprobe_common::config::DEFAULT_PROBE_TIMEOUT_MS;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use crate::scanner::Prober;

/// Reachability prober backed by a plain TCP connect.
#[derive(Debug, Clone, Copy)]
pub struct TcpProber {
    probe_timeout: Duration,
}

impl TcpProber {
    pub fn new(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS))
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, host: &str, port: u16) -> bool {
        handshake_probe(host, port, self.probe_timeout).await
    }
}

/// Attempts a single TCP handshake with `host:port`.
///
/// The stream is dropped as soon as it connects. Refusals, resolution
/// failures and timeouts all read as unreachable.
pub async fn handshake_probe(host: &str, port: u16, probe_timeout: Duration) -> bool {
    match timeout(probe_timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => {
            trace!("{host}:{port} accepted the connection");
            true
        }
        Ok(Err(e)) => {
            trace!("{host}:{port} is unreachable: {e}");
            false
        }
        Err(_elapsed) => false,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const SHORT: Duration = Duration::from_millis(250);

    #[tokio::test]
    async fn handshake_probe_should_find_listening_port() {
        let listener: TcpListener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port: u16 = listener.local_addr().unwrap().port();
        assert!(handshake_probe("127.0.0.1", port, SHORT).await);
    }

    #[tokio::test]
    async fn handshake_probe_should_fail_on_closed_port() {
        let listener: TcpListener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port: u16 = listener.local_addr().unwrap().port();
        drop(listener);
        assert!(!handshake_probe("127.0.0.1", port, SHORT).await);
    }

    #[tokio::test]
    async fn handshake_probe_should_fail_on_unresolvable_host() {
        assert!(!handshake_probe("not a valid host", 8080, SHORT).await);
    }

    #[tokio::test]
    async fn handshake_probe_should_give_up_on_unroutable_ip() {
        // TEST-NET-1 either times out or is rejected, both are unreachable.
        assert!(!handshake_probe("192.0.2.1", 8080, Duration::from_millis(100)).await);
    }

    #[tokio::test]
    async fn tcp_prober_uses_configured_timeout() {
        let prober = TcpProber::new(SHORT);
        assert_eq!(prober.probe_timeout(), SHORT);
        assert_eq!(TcpProber::default().probe_timeout(), Duration::from_millis(1_000));

        let listener: TcpListener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port: u16 = listener.local_addr().unwrap().port();
        assert!(prober.probe("127.0.0.1", port).await);
    }
}
