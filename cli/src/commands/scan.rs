use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use colored::*;
use pawprobe_common::config::Config;
use pawprobe_common::network::interface;
use pawprobe_common::network::subnet::{self, Ipv4Range};
use pawprobe_core::cache::FileCache;
use pawprobe_core::network::tcp::TcpProber;
use pawprobe_core::scanner::{ParallelScanner, Prober};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, warn};

use crate::commands::cancel_on_ctrl_c;
use crate::terminal::{colors, format, print, spinner};

pub async fn scan(cfg: &Config, local_ip: Option<Ipv4Addr>, save: bool) -> anyhow::Result<()> {
    let Some(local_ip) = local_ip
        .or_else(interface::local_ipv4)
        .filter(|ip| !ip.is_unspecified())
    else {
        anyhow::bail!("no local IPv4 address available, pass --local-ip to pick a subnet");
    };

    let port: u16 = cfg.resolver.port;
    let range: Ipv4Range = Ipv4Range::host_range_of(local_ip);
    if cfg.quiet == 0 {
        print::aligned_line("Local IP", local_ip.to_string().color(colors::IPV4_ADDR));
        print::aligned_line("Range", format::range_to_value(&range));
        print::aligned_line("Port", port.to_string().color(colors::ACCENT));
    }

    let scanner: ParallelScanner = ParallelScanner::from_config(&cfg.resolver);
    let prober: Arc<dyn Prober> = Arc::new(TcpProber::new(cfg.resolver.probe_timeout()));
    let cancel: CancellationToken = CancellationToken::new();
    let ctrl_c = cancel_on_ctrl_c(cancel.clone());

    let start_time: Instant = Instant::now();
    let span = spinner::scan_span(format!("Probing {} hosts", range.len()));
    let found: Option<String> = scanner
        .scan(subnet::enumerate(Some(local_ip)), prober, port, &cancel)
        .instrument(span)
        .await;
    ctrl_c.abort();

    let Some(host) = found else {
        print::no_results("NO BACKEND ANSWERED");
        anyhow::bail!("no host in {} answered on port {port}", format::range_label(&range));
    };

    if cfg.quiet > 0 {
        print::print(&host);
    } else {
        print::tree_head("Backend candidate");
        print::as_tree_one_level(vec![
            format::host_to_detail(&host),
            ("Time".to_string(), format!("{:.2}s", start_time.elapsed().as_secs_f64()).yellow()),
        ]);
    }

    if save {
        save_host(cfg, &host)?;
    }
    Ok(())
}

fn save_host(cfg: &Config, host: &str) -> anyhow::Result<()> {
    if cfg.no_cache {
        warn!("--no-cache given, {host} was not saved");
        return Ok(());
    }
    let cache: FileCache = FileCache::from_config(cfg)?;
    cache
        .write(Some(host))
        .with_context(|| format!("failed to save {host} to the resolution cache"))?;
    print::print_status(format!("Saved to {}", cache.path().display()));
    Ok(())
}
