use std::path::PathBuf;
use std::time::Duration;

use port_scan_rs::report::{self, ScanReport};
use port_scan_rs::scanner::{DEFAULT_CONCURRENCY, Scanner};
use port_scan_rs::{logging, ports};

use ::time::OffsetDateTime;
use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::Instant;

/// port-scan-rs — concurrent TCP connect port scanner.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "port-scan-rs",
    version,
    about = "Concurrent TCP connect port scanner driven by a port list file.",
    long_about = None
)]
struct Cli {
    /// Host name or literal IP address to scan.
    target: String,

    /// Path to ports list file (one integer per line).
    #[arg(long, default_value = "common_ports.txt")]
    ports: PathBuf,

    /// Max concurrent TCP connect attempts.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Socket connect timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 2000)]
    timeout_ms: u64,

    /// Write results as pretty JSON to this path (optional).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let list = ports::load_ports_from_path(&cli.ports)
        .context("failed to load port list, no scan performed")?;

    let scanner = Scanner::new(Duration::from_millis(cli.timeout_ms))
        .with_concurrency(cli.concurrency);

    println!("Scanning {} ({} ports)...", cli.target, list.ports.len());
    let started_at = OffsetDateTime::now_utc();
    let start = Instant::now();
    let results = scanner.scan(&cli.target, &list.ports).await;
    let elapsed = start.elapsed();

    let stdout = std::io::stdout();
    report::write_open_ports(&mut stdout.lock(), &results)?;

    if let Some(path) = cli.output.as_deref() {
        let scan_report =
            ScanReport::new(&cli.target, started_at, elapsed, list.skipped, &results);
        report::write_report_json(path, &scan_report)
            .with_context(|| format!("failed to write JSON to {}", path.display()))?;
        println!("Wrote JSON results to {}", path.display());
    }

    Ok(())
}
