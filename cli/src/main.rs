mod commands;
mod terminal;

use anyhow::Context;
use commands::{CacheAction, CommandLine, Commands, cache, info, probe, resolve, scan};
use pawprobe_common::config::Config;
use pawprobe_core::environment;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.quiet);

    let mut cfg: Config =
        Config::load(commands.config.as_deref()).context("failed to load configuration")?;
    cfg.quiet = commands.quiet;
    cfg.no_cache = commands.no_cache;
    cfg.emulator_override = environment::override_from_env();
    if let Some(port) = commands.port {
        cfg.resolver.port = port;
    }

    let result = match commands.command {
        Commands::Resolve { local_ip } => {
            print::header("resolving backend endpoint", cfg.quiet);
            resolve::resolve(&cfg, local_ip).await
        }
        Commands::Scan { local_ip, save } => {
            print::header("scanning local subnet", cfg.quiet);
            scan::scan(&cfg, local_ip, save).await
        }
        Commands::Probe { host } => {
            print::header("probing host", cfg.quiet);
            probe::probe(&cfg, &host).await
        }
        Commands::Cache { action } => {
            print::header("resolution cache", cfg.quiet);
            match action {
                CacheAction::Show => cache::show(&cfg),
                CacheAction::Set { host } => cache::set(&cfg, &host),
                CacheAction::Clear => cache::clear(&cfg),
            }
        }
        Commands::Info => {
            print::header("about this device", cfg.quiet);
            info::info(&cfg)
        }
    };

    print::end_of_program(cfg.quiet);
    result
}
