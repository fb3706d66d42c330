//! Logger module
//!
//! Timestamped, human-readable console lines for the collector:
//! - Startup and shutdown
//! - Saved records and save failures
//! - Access logging with multiple formats
//! - Error and warning logging, optionally to files

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use chrono::Local;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// `[YYYY-MM-DD HH:MM:SS] message`
fn stamped(message: &str) -> String {
    format!("[{}] {message}", Local::now().format("%Y-%m-%d %H:%M:%S"))
}

/// Write to info/access log
fn write_info(message: &str) {
    let line = stamped(message);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    let line = stamped(message);
    match writer::get() {
        Some(w) => w.write_error(&line),
        None => println!("{line}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, data_dir: &Path, file_count: usize) {
    write_info(&format!("Starting data collector on http://{addr}/api"));
    write_info(&format!(
        "Data directory: {} ({file_count} files)",
        data_dir.display()
    ));
    write_info(&format!(
        "Script asset: {}",
        config.script_path().display()
    ));
    write_info(&format!(
        "CORS origins: {}",
        config.cors.allowed_origins.join(", ")
    ));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
}

pub fn log_record_saved(path: &Path) {
    write_info(&format!("Data saved to: {}", path.display()));
}

pub fn log_save_failed(err: &impl Display) {
    write_error(&format!("Failed to save data: {err}"));
}

pub fn log_script_failed(path: &Path, err: &impl Display) {
    write_error(&format!("Failed to serve {}: {err}", path.display()));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_info(message: &str) {
    write_info(message);
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamped_prefix() {
        let line = stamped("Data saved to: x");
        // [YYYY-MM-DD HH:MM:SS] is 21 chars
        assert_eq!(&line[0..1], "[");
        assert_eq!(&line[20..22], "] ");
        assert!(chrono::NaiveDateTime::parse_from_str(&line[1..20], "%Y-%m-%d %H:%M:%S").is_ok());
        assert!(line.ends_with("Data saved to: x"));
    }
}
