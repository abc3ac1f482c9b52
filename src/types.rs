use serde::{Deserialize, Serialize};

/// A port number as handed to the engine. Values outside 1..=65535 are
/// accepted and simply probe as closed.
pub type Port = i64;

/// Outcome of a single probe against one host:port pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub port: Port,
    #[serde(rename = "open")]
    pub is_open: bool,
    /// Recognized service name. Never populated by the TCP connect probe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl ProbeResult {
    pub fn open(port: Port) -> Self {
        Self {
            port,
            is_open: true,
            service: None,
        }
    }

    pub fn closed(port: Port) -> Self {
        Self {
            port,
            is_open: false,
            service: None,
        }
    }
}

/// Every probe result of a finished scan, one per requested port.
///
/// Entries are in completion order, which is not related to input order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResults {
    pub entries: Vec<ProbeResult>,
}

impl ScanResults {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProbeResult> {
        self.entries.iter()
    }

    pub fn open(&self) -> impl Iterator<Item = &ProbeResult> {
        self.entries.iter().filter(|r| r.is_open)
    }

    pub fn open_count(&self) -> usize {
        self.open().count()
    }

    /// Open ports in ascending order. Duplicate input ports stay duplicated.
    pub fn open_ports(&self) -> Vec<Port> {
        let mut ports: Vec<Port> = self.open().map(|r| r.port).collect();
        ports.sort_unstable();
        ports
    }

    /// All entries ordered by port, for stable output.
    pub fn sorted(&self) -> Vec<ProbeResult> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|r| (r.port, !r.is_open));
        entries
    }
}

impl From<Vec<ProbeResult>> for ScanResults {
    fn from(entries: Vec<ProbeResult>) -> Self {
        Self { entries }
    }
}

impl IntoIterator for ScanResults {
    type Item = ProbeResult;
    type IntoIter = std::vec::IntoIter<ProbeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
