use std::net::IpAddr;

use anyhow::{Context, ensure};
use colored::*;
use pawprobe_common::config::Config;
use pawprobe_core::EndpointResolver;
use pawprobe_core::cache::FileCache;
use tracing::warn;

use crate::terminal::{colors, print};

pub fn show(cfg: &Config) -> anyhow::Result<()> {
    let cache: FileCache = FileCache::from_config(cfg)?;
    print::aligned_line("File", cache.path().display().to_string());

    let cached: Option<String> = cache
        .read()
        .context("failed to read the resolution cache")?;
    match cached {
        Some(host) => print::aligned_line("Host", host.color(colors::IPV4_ADDR)),
        None => print::aligned_line("Host", "none".dimmed()),
    }
    Ok(())
}

pub fn set(cfg: &Config, host: &str) -> anyhow::Result<()> {
    let host: &str = host.trim();
    ensure!(is_valid_host(host), "'{host}' is neither an IP address nor a hostname");
    warn_if_ephemeral(cfg);

    let mut resolver: EndpointResolver = EndpointResolver::from_config(cfg);
    resolver.invalidate(host);
    print::print_status(format!("Backend host pinned to {}", host.color(colors::IPV4_ADDR)));
    Ok(())
}

pub fn clear(cfg: &Config) -> anyhow::Result<()> {
    warn_if_ephemeral(cfg);

    let mut resolver: EndpointResolver = EndpointResolver::from_config(cfg);
    resolver.reset();
    print::print_status("Cached backend host forgotten");
    Ok(())
}

fn warn_if_ephemeral(cfg: &Config) {
    if cfg.no_cache {
        warn!("--no-cache given, the change only lasts for this run");
    }
}

fn is_valid_host(host: &str) -> bool {
    if host.parse::<IpAddr>().is_ok() {
        return true;
    }
    !host.is_empty()
        && host.len() <= 253
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_addresses_and_hostnames() {
        assert!(is_valid_host("192.168.1.41"));
        assert!(is_valid_host("fe80::1"));
        assert!(is_valid_host("backend.local"));
        assert!(is_valid_host("api-01"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(!is_valid_host(""));
        assert!(!is_valid_host("two words"));
        assert!(!is_valid_host("trailing."));
        assert!(!is_valid_host("-leading.dash"));
        assert!(!is_valid_host("http://192.168.1.41"));
    }
}
