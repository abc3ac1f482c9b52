use crate::error::PortListError;
use crate::types::Port;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Ports read from a port-list source, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortList {
    pub ports: Vec<Port>,
    /// Non-blank lines that were not a base-10 integer.
    pub skipped: usize,
}

/// Parse newline-delimited port list content.
///
/// Each line is trimmed and parsed as a base-10 integer. Blank lines and lines
/// that fail to parse are skipped. No range check, sorting or deduplication
/// happens here.
pub fn parse_ports_str(s: &str) -> PortList {
    let mut list = PortList::default();

    for (idx, raw_line) in s.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<Port>() {
            Ok(port) => list.ports.push(port),
            Err(e) => {
                debug!(line_no = idx + 1, line, error = %e, "skipping port list line");
                list.skipped += 1;
            }
        }
    }

    list
}

/// Load a port list from a file path. The whole file is read before parsing.
pub fn load_ports_from_path(path: impl AsRef<Path>) -> Result<PortList, PortListError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| PortListError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    // Invalid UTF-8 only spoils the lines it appears on.
    let list = parse_ports_str(&String::from_utf8_lossy(&bytes));
    if list.skipped > 0 {
        debug!(
            path = %path.display(),
            skipped = list.skipped,
            "ignored lines that are not port numbers"
        );
    }
    Ok(list)
}
