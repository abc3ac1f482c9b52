use crate::types::{ProbeResult, ScanResults};
use ::time::{format_description::well_known, OffsetDateTime};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

/// Serializable record of one finished scan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub host: String,
    pub started_at: String,
    pub elapsed_ms: u64,
    pub scanned: usize,
    pub open_count: usize,
    pub skipped_lines: usize,
    pub results: Vec<ProbeResult>,
}

impl ScanReport {
    pub fn new(
        host: &str,
        started_at: OffsetDateTime,
        elapsed: Duration,
        skipped_lines: usize,
        results: &ScanResults,
    ) -> Self {
        Self {
            host: host.to_string(),
            started_at: rfc3339(started_at),
            elapsed_ms: elapsed.as_millis() as u64,
            scanned: results.len(),
            open_count: results.open_count(),
            skipped_lines,
            results: results.sorted(),
        }
    }
}

/// Write the human-readable report: one line per open port, lowest first.
/// Closed ports are not listed.
pub fn write_open_ports<W: Write>(out: &mut W, results: &ScanResults) -> std::io::Result<()> {
    writeln!(out, "\nScan results:")?;
    for port in results.open_ports() {
        writeln!(out, "Port {port} is open")?;
    }
    writeln!(
        out,
        "{} open / {} scanned",
        results.open_count(),
        results.len()
    )
}

pub fn write_report_json(path: &Path, report: &ScanReport) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    Ok(())
}

fn rfc3339(t: OffsetDateTime) -> String {
    t.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScanResults {
        ScanResults::from(vec![
            ProbeResult::open(8080),
            ProbeResult::closed(21),
            ProbeResult::open(22),
        ])
    }

    #[test]
    fn console_lists_only_open_ports_in_order() {
        let mut out = Vec::new();
        write_open_ports(&mut out, &sample()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "\nScan results:\nPort 22 is open\nPort 8080 is open\n2 open / 3 scanned\n"
        );
    }

    #[test]
    fn console_header_only_when_nothing_open() {
        let results = ScanResults::from(vec![ProbeResult::closed(80)]);
        let mut out = Vec::new();
        write_open_ports(&mut out, &results).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("is open"));
        assert!(text.contains("Scan results:"));
    }

    #[test]
    fn report_counts_and_sorts() {
        let report = ScanReport::new(
            "10.0.0.1",
            OffsetDateTime::UNIX_EPOCH,
            Duration::from_millis(1500),
            2,
            &sample(),
        );
        assert_eq!(report.started_at, "1970-01-01T00:00:00Z");
        assert_eq!(report.elapsed_ms, 1500);
        assert_eq!(report.scanned, 3);
        assert_eq!(report.open_count, 2);
        assert_eq!(report.skipped_lines, 2);
        let ports: Vec<_> = report.results.iter().map(|r| r.port).collect();
        assert_eq!(ports, vec![21, 22, 8080]);
    }

    #[test]
    fn json_report_round_trips_through_file() {
        let report = ScanReport::new(
            "localhost",
            OffsetDateTime::UNIX_EPOCH,
            Duration::ZERO,
            0,
            &sample(),
        );
        let path = std::env::temp_dir().join(format!(
            "port-scan-rs-report-{}.json",
            std::process::id()
        ));
        write_report_json(&path, &report).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let parsed: ScanReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, report);
    }
}
