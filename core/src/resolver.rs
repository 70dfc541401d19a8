//! # Endpoint Resolver
//!
//! Decides which backend host this process talks to. The decision runs once,
//! in this order, and the first branch that produces a host wins:
//!
//! 1. **Emulator shortcut**: a virtualized device always uses the loopback
//!    alias of its host machine.
//! 2. **Cache**: the last host found by a scan, if it still answers.
//! 3. **Scan**: every host of the local /24, in parallel.
//! 4. **Fallback**: the configured static host. This branch cannot fail.
//!
//! The result is memoized. Only [`EndpointResolver::invalidate`] and
//! [`EndpointResolver::reset`] make the next call decide again.

use std::sync::Arc;

use pawprobe_common::config::{Config, ResolverConfig};
use pawprobe_common::network::endpoint::{Endpoint, EndpointSource, Resolution};
use pawprobe_common::network::subnet::{self, SubnetCandidates};
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::ApiBase;
use crate::cache::{EndpointCache, FileCache, MemoryCache};
use crate::environment::{EnvironmentProbe, FingerprintHeuristic};
use crate::network::tcp::TcpProber;
use crate::scanner::{ParallelScanner, Prober};
use crate::system::{LocalAddressSource, SystemAddressSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Init,
    CacheCheck,
    Scan,
    Fallback,
}

pub struct EndpointResolver {
    cfg: ResolverConfig,
    prober: Arc<dyn Prober>,
    cache: Arc<dyn EndpointCache>,
    environment: Arc<dyn EnvironmentProbe>,
    addresses: Arc<dyn LocalAddressSource>,
    scanner: ParallelScanner,
    cancel: CancellationToken,
    resolved: OnceCell<Resolution>,
}

impl EndpointResolver {
    /// A resolver probing over TCP on the host's real interfaces.
    ///
    /// Without [`EndpointResolver::with_environment`] the device is taken to
    /// be physical.
    pub fn new(cfg: ResolverConfig, cache: Arc<dyn EndpointCache>) -> Self {
        Self {
            prober: Arc::new(TcpProber::new(cfg.probe_timeout())),
            scanner: ParallelScanner::from_config(&cfg),
            cache,
            environment: Arc::new(FingerprintHeuristic::new(None)),
            addresses: Arc::new(SystemAddressSource),
            cancel: CancellationToken::new(),
            resolved: OnceCell::new(),
            cfg,
        }
    }

    /// Wires a resolver from the application configuration.
    ///
    /// Falls back to an in-memory cache when caching is disabled or no
    /// private storage directory exists.
    pub fn from_config(cfg: &Config) -> Self {
        let cache: Arc<dyn EndpointCache> = if cfg.no_cache {
            Arc::new(MemoryCache::new())
        } else {
            match FileCache::from_config(cfg) {
                Ok(file_cache) => Arc::new(file_cache),
                Err(e) => {
                    warn!("Resolution cache is not persisted: {e}");
                    Arc::new(MemoryCache::new())
                }
            }
        };
        Self::new(cfg.resolver.clone(), cache)
            .with_environment(Arc::new(FingerprintHeuristic::from_config(cfg)))
    }

    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = prober;
        self
    }

    pub fn with_environment(mut self, environment: Arc<dyn EnvironmentProbe>) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_address_source(mut self, addresses: Arc<dyn LocalAddressSource>) -> Self {
        self.addresses = addresses;
        self
    }

    pub fn with_scanner(mut self, scanner: ParallelScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.cfg
    }

    /// Token aborting an in-flight resolution. Nothing found after
    /// cancellation is cached.
    ///
    /// A cancelled token is replaced on [`EndpointResolver::invalidate`] and
    /// [`EndpointResolver::reset`], so fetch it again after either.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The endpoint for this process, deciding it on first use.
    ///
    /// Concurrent first callers share a single resolution.
    pub async fn resolve(&self) -> &Resolution {
        self.resolved.get_or_init(|| self.run()).await
    }

    pub async fn endpoint(&self) -> &Endpoint {
        &self.resolve().await.endpoint
    }

    /// Base for every API call, bound to the resolved endpoint.
    pub async fn api(&self) -> ApiBase {
        ApiBase::from(self.resolve().await)
    }

    /// The memoized resolution, if one was made already.
    pub fn current(&self) -> Option<&Resolution> {
        self.resolved.get()
    }

    /// Pins `new_host` in the cache and forgets the current endpoint.
    ///
    /// The next call to [`EndpointResolver::resolve`] starts over, and will
    /// pick `new_host` up if it answers.
    pub fn invalidate(&mut self, new_host: &str) {
        info!("Backend host overridden with {new_host}");
        self.cache.store(new_host);
        self.start_over();
    }

    /// Empties the cache and forgets the current endpoint.
    pub fn reset(&mut self) {
        info!("Network configuration reset");
        self.cache.clear();
        self.start_over();
    }

    fn start_over(&mut self) {
        self.resolved.take();
        if self.cancel.is_cancelled() {
            debug!("Re-arming cancelled resolver");
            self.cancel = CancellationToken::new();
        }
    }

    async fn run(&self) -> Resolution {
        let port: u16 = self.cfg.port;
        let mut stage: Stage = Stage::Init;

        loop {
            debug!("Resolution stage: {stage:?}");
            stage = match stage {
                Stage::Init => {
                    if self.environment.is_emulator() {
                        return self.settle(&self.cfg.emulator_host, EndpointSource::Emulator);
                    }
                    Stage::CacheCheck
                }
                Stage::CacheCheck => match self.cache.load() {
                    Some(host) => match self.revalidate(&host, port).await {
                        Some(true) => return self.settle(&host, EndpointSource::Cache),
                        Some(false) => {
                            debug!("Cached host {host} did not answer on port {port}");
                            Stage::Scan
                        }
                        None => Stage::Fallback,
                    },
                    None => Stage::Scan,
                },
                Stage::Scan => match self.scan(port).await {
                    Some(host) => {
                        self.cache.store(&host);
                        return self.settle(&host, EndpointSource::Scan);
                    }
                    None => Stage::Fallback,
                },
                Stage::Fallback => {
                    return self.settle(&self.cfg.fallback_host, EndpointSource::Fallback);
                }
            };
        }
    }

    /// Probes the cached host, `None` when cancelled first.
    async fn revalidate(&self, host: &str, port: u16) -> Option<bool> {
        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => {
                debug!("Cache revalidation of {host} cancelled");
                None
            }
            reachable = self.prober.probe(host, port) => Some(reachable),
        }
    }

    async fn scan(&self, port: u16) -> Option<String> {
        let candidates: SubnetCandidates = subnet::enumerate(self.addresses.local_ipv4());
        if candidates.len() == 0 {
            debug!("Local address unavailable, skipping subnet scan");
            return None;
        }
        self.scanner
            .scan(candidates, Arc::clone(&self.prober), port, &self.cancel)
            .await
    }

    fn settle(&self, host: &str, source: EndpointSource) -> Resolution {
        let resolution = Resolution::new(Endpoint::new(host, self.cfg.port), source);
        info!("Backend endpoint {} ({source})", resolution.endpoint);
        resolution
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
