//! Host-owned diagnostic sink
//!
//! Degradations (bad colors, rejected boundaries, crowded spawns) are reported here
//! instead of being logged every frame. The sink is owned by the scene and can be
//! replaced by the host.

use std::collections::HashMap;

/// Receives degradation reports keyed by a stable identifier
pub trait DiagnosticSink {
    fn report(&mut self, key: &str, message: &str);
}

/// Logs each key once, then stays quiet
#[derive(Debug, Default)]
pub struct OnceLog {
    seen: HashMap<String, u32>,
}

impl OnceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reports received for a key (including suppressed ones)
    pub fn count(&self, key: &str) -> u32 {
        self.seen.get(key).copied().unwrap_or(0)
    }
}

impl DiagnosticSink for OnceLog {
    fn report(&mut self, key: &str, message: &str) {
        let count = self.seen.entry(key.to_string()).or_insert(0);
        if *count == 0 {
            log::warn!("{}", message);
        }
        *count += 1;
    }
}

/// Logs at most one message per key for every `every` reports
#[derive(Debug)]
pub struct RateLimitedLog {
    every: u32,
    counts: HashMap<String, u32>,
}

impl RateLimitedLog {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            counts: HashMap::new(),
        }
    }
}

impl DiagnosticSink for RateLimitedLog {
    fn report(&mut self, key: &str, message: &str) {
        let count = self.counts.entry(key.to_string()).or_insert(0);
        if (*count).is_multiple_of(self.every) {
            log::warn!("{} (seen {} times)", message, *count + 1);
        }
        *count += 1;
    }
}

/// Collects reports in memory (tests, host-side dashboards)
#[derive(Debug, Default)]
pub struct VecSink {
    pub reports: Vec<(String, String)>,
}

impl DiagnosticSink for VecSink {
    fn report(&mut self, key: &str, message: &str) {
        self.reports.push((key.to_string(), message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_log_counts_suppressed_reports() {
        let mut sink = OnceLog::new();
        sink.report("color", "bad color");
        sink.report("color", "bad color");
        sink.report("zone", "bad zone");
        assert_eq!(sink.count("color"), 2);
        assert_eq!(sink.count("zone"), 1);
        assert_eq!(sink.count("missing"), 0);
    }

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut sink = VecSink::default();
        sink.report("a", "first");
        sink.report("b", "second");
        assert_eq!(sink.reports[0].0, "a");
        assert_eq!(sink.reports[1].1, "second");
    }
}
