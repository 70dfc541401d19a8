use colored::*;
use pawprobe_common::config::{self, Config};
use pawprobe_common::network::interface;
use pawprobe_common::network::subnet::Ipv4Range;
use pawprobe_core::cache::FileCache;
use pawprobe_core::environment::{EnvironmentProbe, FingerprintHeuristic};

use crate::terminal::{colors, format, print};

pub fn info(cfg: &Config) -> anyhow::Result<()> {
    print::tree_head("Device");
    let mut device = Vec::new();
    match interface::local_ipv4() {
        Some(ip) => {
            device.push(("Local IP".to_string(), ip.to_string().color(colors::IPV4_ADDR)));
            device.push(("Subnet".to_string(), format::range_to_value(&Ipv4Range::host_range_of(ip))));
        }
        None => device.push(("Local IP".to_string(), "unavailable".red())),
    }
    let emulator: bool = FingerprintHeuristic::from_config(cfg).is_emulator();
    device.push(("Emulator".to_string(), if emulator { "yes".cyan() } else { "no".normal() }));
    print::as_tree_one_level(device);

    let resolver = &cfg.resolver;
    print::tree_head("Resolver");
    print::as_tree_one_level(vec![
        ("Port".to_string(), resolver.port.to_string().color(colors::ACCENT)),
        ("Fallback".to_string(), resolver.fallback_host.color(colors::IPV4_ADDR)),
        ("Emulator".to_string(), resolver.emulator_host.color(colors::IPV4_ADDR)),
        ("Timeout".to_string(), format!("{}ms", resolver.probe_timeout_ms).normal()),
        ("In flight".to_string(), resolver.max_in_flight.to_string().normal()),
        ("Deadline".to_string(), format!("{}ms", resolver.scan_deadline_ms).normal()),
    ]);

    print::tree_head("Files");
    let config_path: ColoredString = config::default_config_path()
        .map(|p| p.display().to_string().normal())
        .unwrap_or_else(|| "unavailable".red());
    let cache_path: ColoredString = match FileCache::from_config(cfg) {
        Ok(cache) if cfg.no_cache => format!("{} (disabled)", cache.path().display()).dimmed(),
        Ok(cache) => cache.path().display().to_string().normal(),
        Err(_) => "unavailable".red(),
    };
    print::as_tree_one_level(vec![
        ("Config".to_string(), config_path),
        ("Cache".to_string(), cache_path),
    ]);
    Ok(())
}
