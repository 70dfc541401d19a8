//! Shared fixtures for the end-to-end resolution tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pawprobe_core::scanner::Prober;
use tokio::net::TcpListener;

/// Forwards to another prober, counting every call.
pub struct CountingProber {
    inner: Arc<dyn Prober>,
    calls: AtomicUsize,
}

impl CountingProber {
    pub fn new(inner: Arc<dyn Prober>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for CountingProber {
    async fn probe(&self, host: &str, port: u16) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.probe(host, port).await
    }
}

/// A listener on an ephemeral loopback port, standing in for the backend.
pub async fn fake_backend() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let port = listener.local_addr().expect("listener address").port();
    (listener, port)
}

/// A loopback port nothing listens on.
pub async fn closed_port() -> u16 {
    let (listener, port) = fake_backend().await;
    drop(listener);
    port
}
