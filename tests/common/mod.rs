//! Shared test utilities for the Playrecap test suite.
//!
//! This module provides:
//! - [`CaptureBuffer`], a screen sink that records everything written to it
//! - [`CaptureLog`], a log sink that records every line with its level
//! - Fixtures for run statistics
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use playrecap::callback::{Display, HostStats, LogSink, RunStats, StatusKind};
use tracing::Level;

// ============================================================================
// Output Capture
// ============================================================================

/// A shared buffer that captures written bytes for testing.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    /// Create a new capture buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the captured output as a String.
    pub fn get_output(&self) -> String {
        let bytes = self.inner.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Get the captured output with ANSI codes removed.
    pub fn get_plain_output(&self) -> String {
        console::strip_ansi_codes(&self.get_output()).into_owned()
    }

    /// Check if the buffer contains ANSI color codes.
    pub fn has_ansi_codes(&self) -> bool {
        self.get_output().contains("\x1b[")
    }

    /// Get all plain lines from the buffer.
    pub fn get_lines(&self) -> Vec<String> {
        self.get_plain_output()
            .lines()
            .map(|s| s.to_string())
            .collect()
    }

    /// Count occurrences of a pattern in the plain output.
    pub fn count_occurrences(&self, pattern: &str) -> usize {
        self.get_plain_output().matches(pattern).count()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A log sink that records every line with its level.
#[derive(Debug, Clone, Default)]
pub struct CaptureLog {
    lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CaptureLog {
    /// Create an empty log capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded lines, in order.
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// Recorded text only.
    pub fn texts(&self) -> Vec<String> {
        self.lines().into_iter().map(|(_, text)| text).collect()
    }
}

impl LogSink for CaptureLog {
    fn log(&mut self, level: Level, line: &str) -> io::Result<()> {
        self.lines.lock().unwrap().push((level, line.to_string()));
        Ok(())
    }
}

/// A display writing plain text into fresh capture sinks.
pub fn capture_display() -> (Display, CaptureBuffer, CaptureLog) {
    let screen = CaptureBuffer::new();
    let log = CaptureLog::new();
    let display = Display::new(Box::new(screen.clone()), Box::new(log.clone())).with_color(false);
    (display, screen, log)
}

// ============================================================================
// Fixtures
// ============================================================================

/// Build counters from `(status, count)` pairs.
pub fn host_stats(counts: &[(StatusKind, u64)]) -> HostStats {
    counts
        .iter()
        .fold(HostStats::new(), |stats, (kind, count)| stats.with(*kind, *count))
}

/// Three hosts inserted out of order: one clean, one changed, one failed.
pub fn sample_run() -> RunStats {
    RunStats::new()
        .with_host(
            "db1",
            host_stats(&[(StatusKind::Ok, 4), (StatusKind::Failed, 1), (StatusKind::Rescued, 1)]),
        )
        .with_host(
            "web2",
            host_stats(&[(StatusKind::Ok, 3), (StatusKind::Skipped, 2)]),
        )
        .with_host(
            "app1",
            host_stats(&[
                (StatusKind::Ok, 5),
                (StatusKind::Changed, 2),
                (StatusKind::Ignored, 1),
            ]),
        )
}

/// JSON stats document with every counter present.
pub const SAMPLE_STATS_JSON: &str = r#"{
  "hosts": {
    "web1": {"ok": 5, "changed": 2, "unreachable": 0, "failed": 0, "skipped": 1, "rescued": 0, "ignored": 0},
    "web2": {"ok": 6, "changed": 1, "unreachable": 0, "failed": 1, "skipped": 0, "rescued": 0, "ignored": 0}
  },
  "custom": {
    "region": "eu-west",
    "_run": {"duration": 42}
  }
}"#;
