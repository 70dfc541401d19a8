use std::io::Write;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use pawprobe_common::config::{Config, ResolverConfig};
use pawprobe_common::network::endpoint::{Endpoint, EndpointSource};
use pawprobe_core::cache::{EndpointCache, FileCache};
use pawprobe_core::environment::StaticEnvironment;
use pawprobe_core::network::tcp::TcpProber;
use pawprobe_core::system::StaticAddress;
use pawprobe_core::EndpointResolver;
use pawprobe_integration_tests::{closed_port, fake_backend, CountingProber};
use tokio_util::sync::CancellationToken;

fn resolver_config(port: u16) -> ResolverConfig {
    ResolverConfig {
        port,
        fallback_host: "192.0.2.41".to_string(),
        probe_timeout_ms: 250,
        scan_deadline_ms: 5_000,
        ..ResolverConfig::default()
    }
}

fn counting_tcp_prober() -> Arc<CountingProber> {
    Arc::new(CountingProber::new(Arc::new(TcpProber::new(
        Duration::from_millis(250),
    ))))
}

/// Every 127.0.0.0/8 address is local on Linux, so a /24 sweep of 127.0.0.x
/// runs against real sockets without leaving the machine.
#[tokio::test]
#[cfg(target_os = "linux")]
async fn loopback_scan_finds_backend_and_persists_it() -> anyhow::Result<()> {
    let (_backend, port) = fake_backend().await;
    let data_dir = tempfile::tempdir()?;
    let cache = Arc::new(FileCache::new(data_dir.path()));

    let resolver = EndpointResolver::new(resolver_config(port), cache.clone())
        .with_environment(Arc::new(StaticEnvironment(false)))
        .with_address_source(Arc::new(StaticAddress(Some(Ipv4Addr::new(127, 0, 0, 56)))));

    let resolution = resolver.resolve().await;

    assert_eq!(resolution.endpoint, Endpoint::new("127.0.0.1", port));
    assert_eq!(resolution.source, EndpointSource::Scan);
    assert_eq!(cache.load().as_deref(), Some("127.0.0.1"));

    // A fresh process reuses the cached host after one revalidation probe.
    let prober = counting_tcp_prober();
    let reopened = Arc::new(FileCache::new(data_dir.path()));
    let restarted = EndpointResolver::new(resolver_config(port), reopened)
        .with_prober(prober.clone())
        .with_environment(Arc::new(StaticEnvironment(false)))
        .with_address_source(Arc::new(StaticAddress(Some(Ipv4Addr::new(127, 0, 0, 56)))));

    let resolution = restarted.resolve().await;
    assert_eq!(resolution.source, EndpointSource::Cache);
    assert_eq!(resolution.endpoint.host, "127.0.0.1");
    assert_eq!(prober.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn stale_cache_without_local_address_falls_back() -> anyhow::Result<()> {
    let port = closed_port().await;
    let data_dir = tempfile::tempdir()?;
    let cache = Arc::new(FileCache::new(data_dir.path()));
    cache.store("127.0.0.1");

    let prober = counting_tcp_prober();
    let resolver = EndpointResolver::new(resolver_config(port), cache.clone())
        .with_prober(prober.clone())
        .with_environment(Arc::new(StaticEnvironment(false)))
        .with_address_source(Arc::new(StaticAddress(None)));

    let resolution = resolver.resolve().await;

    assert_eq!(resolution.endpoint, Endpoint::new("192.0.2.41", port));
    assert_eq!(resolution.source, EndpointSource::Fallback);
    assert_eq!(prober.calls(), 1);
    // A failed revalidation does not erase the entry.
    assert_eq!(cache.load().as_deref(), Some("127.0.0.1"));
    Ok(())
}

#[tokio::test]
async fn emulator_needs_no_network() -> anyhow::Result<()> {
    let data_dir = tempfile::tempdir()?;
    let cache = Arc::new(FileCache::new(data_dir.path()));
    cache.store("127.0.0.1");

    let prober = counting_tcp_prober();
    let resolver = EndpointResolver::new(ResolverConfig::default(), cache)
        .with_prober(prober.clone())
        .with_environment(Arc::new(StaticEnvironment(true)))
        .with_address_source(Arc::new(StaticAddress(Some(Ipv4Addr::new(192, 168, 1, 56)))));

    let api = resolver.api().await;

    assert_eq!(api.base_url(), "http://10.0.2.2:8080/");
    assert_eq!(prober.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn operator_override_is_picked_up_on_next_resolution() -> anyhow::Result<()> {
    let (_backend, port) = fake_backend().await;
    let data_dir = tempfile::tempdir()?;
    let cache = Arc::new(FileCache::new(data_dir.path()));

    let mut resolver = EndpointResolver::new(resolver_config(port), cache.clone())
        .with_environment(Arc::new(StaticEnvironment(false)))
        .with_address_source(Arc::new(StaticAddress(None)));

    assert_eq!(resolver.resolve().await.source, EndpointSource::Fallback);

    resolver.invalidate("127.0.0.1");
    let resolution = resolver.resolve().await;
    assert_eq!(resolution.endpoint, Endpoint::new("127.0.0.1", port));
    assert_eq!(resolution.source, EndpointSource::Cache);

    resolver.reset();
    assert_eq!(cache.load(), None);
    assert_eq!(resolver.resolve().await.source, EndpointSource::Fallback);
    Ok(())
}

#[tokio::test]
async fn config_file_drives_the_wiring() -> anyhow::Result<()> {
    let data_dir = tempfile::tempdir()?;
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        "[resolver]\nport = 9090\n\n[storage]\ndata_dir = {:?}\n\n[device]\nhardware = \"ranchu\"\n",
        data_dir.path().display().to_string()
    )?;

    let cfg = Config::load(Some(file.path()))?;
    let resolver = EndpointResolver::from_config(&cfg);
    let resolution = resolver.resolve().await;

    assert_eq!(resolution.endpoint, Endpoint::new("10.0.2.2", 9090));
    assert_eq!(resolution.source, EndpointSource::Emulator);
    assert_eq!(
        FileCache::from_config(&cfg)?.path(),
        data_dir.path().join("network_prefs.toml")
    );
    Ok(())
}

#[tokio::test]
async fn cancellation_prevents_caching() -> anyhow::Result<()> {
    let (_backend, port) = fake_backend().await;
    let data_dir = tempfile::tempdir()?;
    let cache = Arc::new(FileCache::new(data_dir.path()));
    let token = CancellationToken::new();
    token.cancel();

    let resolver = EndpointResolver::new(resolver_config(port), cache.clone())
        .with_environment(Arc::new(StaticEnvironment(false)))
        .with_address_source(Arc::new(StaticAddress(Some(Ipv4Addr::new(127, 0, 0, 56)))))
        .with_cancellation(token);

    let resolution = resolver.resolve().await;

    assert_eq!(resolution.source, EndpointSource::Fallback);
    assert_eq!(cache.load(), None);
    Ok(())
}
