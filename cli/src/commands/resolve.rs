use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::*;
use pawprobe_common::config::Config;
use pawprobe_common::network::endpoint::Resolution;
use pawprobe_core::EndpointResolver;
use pawprobe_core::system::StaticAddress;
use tracing::Instrument;

use crate::commands::cancel_on_ctrl_c;
use crate::terminal::{colors, format, print, spinner};

pub async fn resolve(cfg: &Config, local_ip: Option<Ipv4Addr>) -> anyhow::Result<()> {
    let mut resolver: EndpointResolver = EndpointResolver::from_config(cfg);
    if let Some(ip) = local_ip {
        resolver = resolver.with_address_source(Arc::new(StaticAddress(Some(ip))));
    }

    let ctrl_c = cancel_on_ctrl_c(resolver.cancellation_token());

    let start_time: Instant = Instant::now();
    let span = spinner::scan_span(format!(
        "Looking for the backend on port {}",
        cfg.resolver.port
    ));
    let resolution: Resolution = resolver.resolve().instrument(span).await.clone();
    ctrl_c.abort();

    print_resolution(&resolution, start_time.elapsed(), cfg);
    Ok(())
}

fn print_resolution(resolution: &Resolution, total_time: Duration, cfg: &Config) {
    if cfg.quiet > 0 {
        print::print(&resolution.endpoint.base_url());
        return;
    }

    print::tree_head("Backend endpoint");
    print::as_tree_one_level(format::resolution_to_details(resolution));

    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString =
        format!("Resolved via {} in {total_time}", resolution.source).color(colors::TEXT_DEFAULT);
    print::centerln(&output.to_string());
}
