use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;

pub mod config;
use config::{MonitorConfig, load_config};
use config::app_config::split_list;
pub mod probe;
use probe::{NetworkProber, ProbeScheduler};
pub mod report;
pub mod results;
use results::{DnsProbeResult, PingProbeResult};
pub mod storage;
use storage::{JsonLog, SqlSink};

fn to_fixed_width(input: &str, width: usize) -> String {
    use unicode_truncate::UnicodeTruncateStr;

    let (truncated, _) = input.unicode_truncate(width);
    format!("{:<width$}", truncated, width = width)
}

#[derive(Debug, Parser)]
#[command(name = "netmon", version, about = "DNS and ICMP latency monitor")]
struct Cli {
    /// Verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the selected probes and store the results
    Probe(ProbeArgs),
    /// Print averages over every stored result
    Report,
}

#[derive(Debug, Args)]
struct ProbeArgs {
    /// DNS servers to use (comma separated)
    #[arg(long)]
    servers: Option<String>,

    /// Hostnames to resolve (comma separated)
    #[arg(long)]
    hostnames: Option<String>,

    /// Host to ping next to the gateway
    #[arg(long)]
    ips: Option<String>,

    /// Perform DNS test
    #[arg(long)]
    dns_test: bool,

    /// Perform ping test
    #[arg(long)]
    ping_test: bool,

    /// Append results to the JSON result files
    #[arg(long)]
    save_to_file: bool,

    /// Save DNS results to the SQL database
    #[arg(long)]
    save_to_sql: bool,
}

impl ProbeArgs {
    fn apply(&self, config: &mut MonitorConfig) {
        if let Some(servers) = &self.servers {
            config.dns.servers = split_list(servers);
        }
        if let Some(hostnames) = &self.hostnames {
            config.dns.hostnames = split_list(hostnames);
        }
        if let Some(ips) = &self.ips {
            config.ping.target = ips.trim().to_string();
        }
    }
}

fn init_logger(verbose: bool) {
    let default_filter = if verbose { "info,netmon=debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let mut config = load_config().context("failed to load configuration")?;

    match cli.command {
        Command::Probe(args) => {
            args.apply(&mut config);
            run_probes(&config, &args, cli.verbose).await
        }
        Command::Report => run_report(&config),
    }
}

async fn run_probes(config: &MonitorConfig, args: &ProbeArgs, verbose: bool) -> anyhow::Result<()> {
    if !args.dns_test && !args.ping_test {
        log::warn!("⚠️ No tests selected. Exiting...");
        return Ok(());
    }

    log::info!("🚀 Starting network monitor...");

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling in-flight probes");
            ctrl_c.cancel();
        }
    });

    let prober = Arc::new(NetworkProber::new(config.probe_settings(verbose)));
    let scheduler = ProbeScheduler::new(prober, cancel);
    let mut sink_failures = 0;

    if args.dns_test {
        log::debug!("ℹ️ [DNS] Starting DNS test...");
        let batch = scheduler.run_dns(&config.dns.servers, &config.dns.hostnames).await;

        if args.save_to_file {
            let store = JsonLog::<DnsProbeResult>::new(&config.storage.dns_file);
            if let Err(e) = store.append(&batch) {
                log::error!("⚠️ Failed to append to file: {}", probe::error_chain(&e));
                sink_failures += 1;
            }
        }

        if args.save_to_sql {
            match SqlSink::from_env().await {
                Ok(sink) => {
                    let inserted = sink.insert_dns_results(&batch).await;
                    log::info!("ℹ️ [SQL] Stored {inserted} of {} result(s)", batch.len());
                }
                Err(e) => {
                    log::error!("⚠️ Failed to save to SQL: {}", probe::error_chain(&e));
                    sink_failures += 1;
                }
            }
        }
    }

    if args.ping_test {
        let batch = scheduler.run_ping(&config.ping.target, &config.ping.gateway).await;

        if args.save_to_file {
            let store = JsonLog::<PingProbeResult>::new(&config.storage.ping_file);
            if let Err(e) = store.append(&batch) {
                log::error!("⚠️ Failed to append to file: {}", probe::error_chain(&e));
                sink_failures += 1;
            }
        }
    }

    if sink_failures > 0 {
        anyhow::bail!("{sink_failures} result sink(s) failed");
    }
    Ok(())
}

fn run_report(config: &MonitorConfig) -> anyhow::Result<()> {
    log::info!("[i] Starting the analysis..");

    let dns_log = JsonLog::<DnsProbeResult>::new(&config.storage.dns_file);
    let dns = dns_log
        .load_all()
        .with_context(|| format!("failed to load DNS results from {}", dns_log.path().display()))?;
    log::info!("[i] Length of dns results: {}", dns.len());

    let ping_log = JsonLog::<PingProbeResult>::new(&config.storage.ping_file);
    let ping = ping_log
        .load_all()
        .with_context(|| format!("failed to load ping results from {}", ping_log.path().display()))?;
    log::info!("[i] Length of ping results: {}", ping.len());

    println!("{}", report::format_ping_summary(&report::ping_average(&ping)));
    for line in report::format_dns_summary(&report::dns_average_by_server(&dns)) {
        println!("{line}");
    }

    log::info!("[i] Analysis complete..");
    Ok(())
}
