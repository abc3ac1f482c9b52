use crate::probe::probe;
use crate::types::{Port, ProbeResult, ScanResults};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Probes allowed in flight when no limit is configured.
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Per-probe connect timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Scan `ports` on `host` with asynchronous TCP connects and a concurrency limit.
///
/// - Admission uses a `Semaphore`: the launcher waits for a permit before
///   spawning the next probe, so work is delayed, never dropped.
/// - Each probe is bounded by `timeout` via `tokio::time::timeout`.
/// - Returns once every probe has finished, with exactly one entry per input port.
pub async fn scan_ports(
    host: &str,
    ports: &[Port],
    timeout: Duration,
    concurrency: usize,
) -> ScanResults {
    scan_ports_with(host, ports, concurrency, move |host: Arc<str>, port| async move {
        probe(&host, port, timeout).await
    })
    .await
}

/// Variant of [`scan_ports`] that runs a caller-supplied probe for each port.
pub async fn scan_ports_with<F, Fut>(
    host: &str,
    ports: &[Port],
    concurrency: usize,
    prober: F,
) -> ScanResults
where
    F: Fn(Arc<str>, Port) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProbeResult> + Send + 'static,
{
    if ports.is_empty() {
        debug!(host, "no ports requested, nothing to scan");
        return ScanResults::default();
    }

    let limit = concurrency.clamp(1, Semaphore::MAX_PERMITS);
    if limit != concurrency {
        warn!(requested = concurrency, limit, "concurrency limit adjusted");
    }

    info!(host, ports = ports.len(), concurrency = limit, "starting scan");
    let started = Instant::now();

    let host: Arc<str> = Arc::from(host);
    let prober = Arc::new(prober);
    let entries = Arc::new(Mutex::new(Vec::with_capacity(ports.len())));
    let sem = Arc::new(Semaphore::new(limit));
    let mut set = JoinSet::new();

    for &port in ports {
        // The semaphore is never closed while the scan runs.
        let Ok(permit) = sem.clone().acquire_owned().await else {
            break;
        };
        let host = host.clone();
        let prober = prober.clone();
        let entries = entries.clone();

        set.spawn(async move {
            let _permit = permit; // released when the task ends, panics included
            let result = prober(host, port).await;
            entries.lock().await.push(result);
        });
    }

    let mut panicked = 0usize;
    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            if e.is_panic() {
                panicked += 1;
            }
            warn!(error = %e, "probe task did not complete");
        }
    }

    let mut entries = std::mem::take(&mut *entries.lock().await);
    if entries.len() < ports.len() {
        warn!(panicked, "recording missing probe results as closed");
        fill_missing(&mut entries, ports);
    }

    let results = ScanResults::from(entries);
    info!(
        scanned = results.len(),
        open = results.open_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scan finished"
    );
    results
}

/// Add a closed entry for every requested port that has no result yet,
/// counting duplicates.
fn fill_missing(entries: &mut Vec<ProbeResult>, ports: &[Port]) {
    let mut seen: HashMap<Port, usize> = HashMap::new();
    for r in entries.iter() {
        *seen.entry(r.port).or_default() += 1;
    }
    for &port in ports {
        match seen.get_mut(&port) {
            Some(n) if *n > 0 => *n -= 1,
            _ => entries.push(ProbeResult::closed(port)),
        }
    }
}

/// Scan configuration held between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scanner {
    timeout: Duration,
    concurrency: usize,
}

impl Scanner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn scan(&self, host: &str, ports: &[Port]) -> ScanResults {
        scan_ports(host, ports, self.timeout, self.concurrency).await
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}
