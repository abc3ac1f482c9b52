//! Library crate for port-scan-rs exposing reusable modules.
pub mod error;
pub mod logging;
pub mod ports;
pub mod probe;
pub mod report;
pub mod scanner;
pub mod types;
