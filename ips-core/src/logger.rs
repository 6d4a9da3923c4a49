//! The logging boundary the matcher and loader write through.
//!
//! `Logger` is an explicit trait object passed into every call rather than
//! a global singleton, so the core stays testable without wiring up a real
//! sink. Alert-line formatting is split out into pure functions below so
//! the exact wording can be unit tested independent of any `Logger` impl.

pub trait Logger {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    /// Only expected to produce output when `is_verbose()` is true; callers
    /// don't gate on it themselves.
    fn verbose(&self, message: &str);
    fn alert(&self, message: &str);
    /// Bypasses level formatting entirely — used for the second line of a
    /// rule-match alert, which original_source prints undecorated.
    fn write_raw(&self, message: &str);
    fn is_verbose(&self) -> bool;
}

/// A `Logger` that discards everything. Useful as a default in tests and
/// anywhere a caller doesn't care about observability.
pub struct NullLogger;

impl Logger for NullLogger {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn verbose(&self, _message: &str) {}
    fn alert(&self, _message: &str) {}
    fn write_raw(&self, _message: &str) {}
    fn is_verbose(&self) -> bool {
        false
    }
}

pub fn format_rule_alert_header(
    src_ip: &str,
    src_port: u16,
    dst_ip: &str,
    dst_port: u16,
    protocol: &str,
) -> String {
    format!("{src_ip}:{src_port} -> {dst_ip}:{dst_port} ({protocol})")
}

pub fn format_rule_alert_detail(description: &str, rule_id: i64) -> String {
    format!("| Matches rule: \"{description}\" (ID: {rule_id})")
}

pub fn format_rate_limit_alert(
    ip: &str,
    max_requests: i64,
    time_window_seconds: i64,
    ban_duration_seconds: i64,
) -> String {
    format!(
        "Rate limit exceeded by {ip} (exceeded {max_requests} packets per {time_window_seconds} seconds) - Banned for {ban_duration_seconds} seconds"
    )
}

pub fn format_ban_alert(ip: &str) -> String {
    format!("Banned IP {ip} attempted connection")
}
