//! Per-session system information recorded alongside every result

use std::process::Command;

use sysinfo::System;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::connection::ConnectionDescriptor;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Host and toolchain facts captured once per benchmark session and
/// copied into every ResultRecord, so a CSV row is self-describing even
/// when merged with results from other machines.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub timestamp: String,
    pub platform: String,
    pub rustc_version: String,
    pub cpu_count: usize,
    pub memory_gb: f64,
    pub sql_server_host: String,
    pub network_context: String,
}

impl SessionInfo {
    pub fn collect(descriptor: &ConnectionDescriptor) -> Self {
        let mut system = System::new();
        system.refresh_memory();
        let memory_gb = (system.total_memory() as f64 / BYTES_PER_GB * 10.0).round() / 10.0;

        let network_context = if descriptor.is_local() { "local" } else { "remote" };

        Self {
            timestamp: session_timestamp(),
            platform: platform_string(),
            rustc_version: rustc_version(),
            cpu_count: std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1),
            memory_gb,
            sql_server_host: descriptor.server.clone(),
            network_context: network_context.to_string(),
        }
    }
}

fn session_timestamp() -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_else(|_| "unknown".to_string())
}

fn platform_string() -> String {
    let os = System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string());
    format!("{os} ({})", std::env::consts::ARCH)
}

fn rustc_version() -> String {
    Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
