//! CLI entry point: wires config, logging, rule loading, and a packet
//! source into `ips_core::decide`.
//!
//! Grounded on `synaptik-agent::main` (teacher): a `clap::Parser` CLI with a
//! handful of overrides layered over a config file, `anyhow::Result<()>` +
//! `.context(...)` throughout, and a plain loop driving one unit of work at
//! a time.

mod config;
mod console_logger;
mod packet_source;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use config::{IpsConfig, PacketSourceKind};
use console_logger::TracingLogger;
use ips_core::{decide, parse_all_rules, Logger, RateLimiter};
use packet_source::{JsonlPacketSource, PacketSource};

#[derive(Parser, Debug)]
#[command(name = "ips", about = "Host-level intrusion prevention system")]
struct Cli {
    /// Path to the YAML config file.
    #[arg(long, default_value = "/etc/ips/config.yaml")]
    config: PathBuf,

    /// Override the rules file path from the config.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Override `verbose` from the config.
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt::init();

    let mut cfg = IpsConfig::load(&cli.config).context("loading ips config")?;
    if let Some(rules) = cli.rules {
        cfg.rules_path = rules;
    }
    if cli.verbose {
        cfg.verbose = true;
    }

    let logger = TracingLogger::new(cfg.verbose, cfg.log_path.as_ref()).context("setting up logger")?;

    let rules = parse_all_rules(&cfg.rules_path, &logger)
        .with_context(|| format!("loading rules from {}", cfg.rules_path.display()))?;
    logger.info(&format!("Loaded {} rules from {}", rules.len(), cfg.rules_path.display()));

    let limiter = RateLimiter::new();
    let mut source = build_packet_source(&cfg)?;

    run(&mut *source, &rules, &limiter, &logger)
}

fn build_packet_source(cfg: &IpsConfig) -> Result<Box<dyn PacketSource>> {
    match cfg.packets.source {
        PacketSourceKind::Stdin => Ok(Box::new(JsonlPacketSource::stdin())),
        PacketSourceKind::File => {
            let path = cfg
                .packets
                .path
                .as_ref()
                .context("packets.source is \"file\" but packets.path is not set")?;
            Ok(Box::new(JsonlPacketSource::open(path)?))
        }
    }
}

fn run(
    source: &mut dyn PacketSource,
    rules: &[ips_core::Rule],
    limiter: &RateLimiter,
    logger: &dyn Logger,
) -> Result<()> {
    while let Some(packet) = source.next_packet().context("reading next packet")? {
        let accept = decide(&packet.as_view(), rules, limiter, logger);
        logger.verbose(&format!(
            "{}:{} -> {}:{} verdict={}",
            packet.src_ip,
            packet.src_port,
            packet.dst_ip,
            packet.dst_port,
            if accept { "accept" } else { "drop" }
        ));
    }
    Ok(())
}
