use std::time::Instant;

use colored::*;
use pawprobe_common::config::Config;
use pawprobe_core::network::tcp::TcpProber;
use pawprobe_core::scanner::Prober;

use crate::terminal::{format, print};

pub async fn probe(cfg: &Config, host: &str) -> anyhow::Result<()> {
    let prober: TcpProber = TcpProber::new(cfg.resolver.probe_timeout());
    let port: u16 = cfg.resolver.port;

    let start_time: Instant = Instant::now();
    let reachable: bool = prober.probe(host, port).await;
    let elapsed: String = format!("{}ms", start_time.elapsed().as_millis());

    print::aligned_line("Target", format!("{host}:{port}"));
    print::aligned_line("Status", format::verdict(reachable));
    print::aligned_line("Time", elapsed.yellow());

    if !reachable {
        anyhow::bail!("{host}:{port} did not accept a connection within {}ms", prober.probe_timeout().as_millis());
    }
    Ok(())
}
