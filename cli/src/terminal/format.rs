use crate::terminal::colors;
use colored::*;
use pawprobe_common::network::endpoint::{EndpointSource, Resolution};
use pawprobe_common::network::subnet::Ipv4Range;

pub type Detail = (String, ColoredString);

pub fn resolution_to_details(resolution: &Resolution) -> Vec<Detail> {
    vec![
        host_to_detail(&resolution.endpoint.host),
        ("Port".to_string(), resolution.endpoint.port.to_string().color(colors::ACCENT)),
        source_to_detail(resolution.source),
        ("Base URL".to_string(), resolution.endpoint.base_url().color(colors::URL)),
    ]
}

pub fn host_to_detail(host: &str) -> Detail {
    ("Host".to_string(), host.color(colors::IPV4_ADDR).bold())
}

pub fn source_to_detail(source: EndpointSource) -> Detail {
    let value: ColoredString = match source {
        EndpointSource::Scan | EndpointSource::Cache => source.to_string().green(),
        EndpointSource::Emulator => source.to_string().cyan(),
        EndpointSource::Fallback => source.to_string().yellow(),
    };
    ("Source".to_string(), value)
}

pub fn range_label(range: &Ipv4Range) -> String {
    format!("{}-{}", range.start_addr, range.end_addr)
}

pub fn range_to_value(range: &Ipv4Range) -> ColoredString {
    let start: ColoredString = range.start_addr.to_string().color(colors::IPV4_ADDR);
    let end: ColoredString = range.end_addr.to_string().color(colors::IPV4_ADDR);
    format!("{start} - {end} ({} hosts)", range.len()).color(colors::SEPARATOR)
}

pub fn verdict(reachable: bool) -> ColoredString {
    if reachable {
        "reachable".green().bold()
    } else {
        "unreachable".red().bold()
    }
}
