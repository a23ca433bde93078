//! Data types shared by the recap renderer, the progress tracker and the
//! event dispatcher.
//!
//! ## Categories
//!
//! - **Status**: [`StatusKind`], the closed set of per-task outcomes
//! - **Counters**: [`HostStats`] and [`RunStats`], the finalized run totals
//! - **Documents**: [`RunStatsDocument`], the serde form of [`RunStats`]
//! - **Events**: [`LifecycleEvent`], everything the execution engine reports

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Reserved custom-stats key holding run-level (not per-host) metrics.
pub const RUN_CUSTOM_KEY: &str = "_run";

// ============================================================================
// Status
// ============================================================================

/// Outcome category of a task result.
///
/// The set is closed and the declaration order is the canonical display
/// order used by every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Completed without changes
    Ok,
    /// Completed and changed something
    Changed,
    /// Host could not be reached
    Unreachable,
    /// Task failed
    Failed,
    /// Task was skipped
    Skipped,
    /// Failure handled by a rescue block
    Rescued,
    /// Failure ignored via ignore_errors
    Ignored,
}

impl StatusKind {
    /// All statuses in canonical display order.
    pub const ALL: [StatusKind; 7] = [
        StatusKind::Ok,
        StatusKind::Changed,
        StatusKind::Unreachable,
        StatusKind::Failed,
        StatusKind::Skipped,
        StatusKind::Rescued,
        StatusKind::Ignored,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Ok => "ok",
            StatusKind::Changed => "changed",
            StatusKind::Unreachable => "unreachable",
            StatusKind::Failed => "failed",
            StatusKind::Skipped => "skipped",
            StatusKind::Rescued => "rescued",
            StatusKind::Ignored => "ignored",
        }
    }

    /// Position in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a status by name.
    ///
    /// Accepts the canonical names plus the counter names used by
    /// Ansible's aggregate stats (`failures`, `dark`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ok" => Some(StatusKind::Ok),
            "changed" => Some(StatusKind::Changed),
            "unreachable" | "dark" => Some(StatusKind::Unreachable),
            "failed" | "failures" => Some(StatusKind::Failed),
            "skipped" => Some(StatusKind::Skipped),
            "rescued" => Some(StatusKind::Rescued),
            "ignored" => Some(StatusKind::Ignored),
            _ => None,
        }
    }

    /// Whether this status counts as a host failure for coloring.
    pub fn is_failure(&self) -> bool {
        matches!(self, StatusKind::Failed | StatusKind::Unreachable)
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StatusKind::from_name(s.trim()).ok_or_else(|| Error::Config(format!("unknown status '{s}'")))
    }
}

// ============================================================================
// Host Statistics
// ============================================================================

/// Per-host result counters for one run.
///
/// Built once by the execution engine (or from a [`RunStatsDocument`]) and
/// read-only afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HostStats {
    counts: [u64; 7],
}

impl HostStats {
    /// Create statistics with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with the counter for `kind` set to `count`.
    pub fn with(mut self, kind: StatusKind, count: u64) -> Self {
        self.counts[kind.index()] = count;
        self
    }

    /// Build from a name → count map.
    ///
    /// Unknown names are always rejected. Missing names are rejected under
    /// [`MissingCountPolicy::Reject`] and read as zero under
    /// [`MissingCountPolicy::Zero`].
    pub fn from_counters(
        host: &str,
        counters: &BTreeMap<String, u64>,
        policy: MissingCountPolicy,
    ) -> Result<Self> {
        let mut seen = [false; 7];
        let mut stats = HostStats::new();

        for (name, count) in counters {
            let kind = StatusKind::from_name(name)
                .ok_or_else(|| Error::malformed(host, format!("unknown status '{name}'")))?;
            if seen[kind.index()] {
                return Err(Error::malformed(
                    host,
                    format!("status '{kind}' given more than once"),
                ));
            }
            seen[kind.index()] = true;
            stats.counts[kind.index()] = *count;
        }

        if policy == MissingCountPolicy::Reject {
            let missing: Vec<&str> = StatusKind::ALL
                .iter()
                .filter(|kind| !seen[kind.index()])
                .map(|kind| kind.as_str())
                .collect();
            if !missing.is_empty() {
                return Err(Error::malformed(
                    host,
                    format!("missing counters: {}", missing.join(", ")),
                ));
            }
        }

        if stats.checked_total().is_none() {
            return Err(Error::malformed(host, "counter overflow"));
        }

        Ok(stats)
    }

    /// Counter for one status.
    pub fn get(&self, kind: StatusKind) -> u64 {
        self.counts[kind.index()]
    }

    /// Sum of all seven counters, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .fold(0u64, |total, count| total.saturating_add(*count))
    }

    /// Sum of all seven counters, `None` on overflow.
    pub fn checked_total(&self) -> Option<u64> {
        self.counts
            .iter()
            .try_fold(0u64, |total, count| total.checked_add(*count))
    }

    /// Whether the host failed or was unreachable at least once.
    pub fn has_failures(&self) -> bool {
        self.get(StatusKind::Failed) > 0 || self.get(StatusKind::Unreachable) > 0
    }

    /// Whether the host changed at least once.
    pub fn has_changes(&self) -> bool {
        self.get(StatusKind::Changed) > 0
    }

    /// Iterate counters in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (StatusKind, u64)> + '_ {
        StatusKind::ALL.iter().map(|kind| (*kind, self.get(*kind)))
    }

    /// Status used to tint the host name: failures first, then changes.
    pub fn tone(&self) -> StatusKind {
        if self.has_failures() {
            StatusKind::Failed
        } else if self.has_changes() {
            StatusKind::Changed
        } else {
            StatusKind::Ok
        }
    }
}

/// How to treat a status key absent from a host's counter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCountPolicy {
    /// Fail with `MalformedStats`
    #[default]
    Reject,
    /// Read the absent counter as zero
    Zero,
}

impl FromStr for MissingCountPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(MissingCountPolicy::Reject),
            "zero" => Ok(MissingCountPolicy::Zero),
            other => Err(Error::Config(format!("unknown missing-count policy '{other}'"))),
        }
    }
}

// ============================================================================
// Run Statistics
// ============================================================================

/// Finalized statistics for a whole run.
///
/// Hosts keep the order in which they were added; renderers sort them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    hosts: IndexMap<String, HostStats>,
    custom: BTreeMap<String, JsonValue>,
}

impl RunStats {
    /// Create empty run statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a host's counters.
    pub fn with_host(mut self, host: impl Into<String>, stats: HostStats) -> Self {
        self.hosts.insert(host.into(), stats);
        self
    }

    /// Add a per-host custom metric.
    pub fn with_custom(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.custom.insert(key.into(), value);
        self
    }

    /// Set the run-level custom metrics stored under [`RUN_CUSTOM_KEY`].
    pub fn with_run_custom(mut self, value: JsonValue) -> Self {
        self.custom.insert(RUN_CUSTOM_KEY.to_string(), value);
        self
    }

    /// Counters for one host.
    pub fn host(&self, name: &str) -> Option<&HostStats> {
        self.hosts.get(name)
    }

    /// Hosts in insertion order.
    pub fn hosts(&self) -> impl Iterator<Item = (&str, &HostStats)> {
        self.hosts.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    /// Hosts in lexicographic order of their identifiers.
    pub fn sorted_hosts(&self) -> Vec<(&str, &HostStats)> {
        let mut hosts: Vec<_> = self.hosts().collect();
        hosts.sort_by(|a, b| a.0.cmp(b.0));
        hosts
    }

    /// All custom metrics, including the run-level entry.
    pub fn custom(&self) -> &BTreeMap<String, JsonValue> {
        &self.custom
    }

    /// Custom metrics other than the run-level entry, sorted by key.
    pub fn host_custom(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.custom
            .iter()
            .filter(|(key, _)| key.as_str() != RUN_CUSTOM_KEY)
            .map(|(key, value)| (key.as_str(), value))
    }

    /// The run-level custom metrics, if any.
    pub fn run_custom(&self) -> Option<&JsonValue> {
        self.custom.get(RUN_CUSTOM_KEY)
    }

    /// Number of hosts processed.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Whether no host was processed.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// Serialized form of [`RunStats`] as produced by an execution engine.
///
/// ```yaml
/// hosts:
///   web1: { ok: 5, changed: 2, unreachable: 0, failed: 0, skipped: 1, rescued: 0, ignored: 0 }
/// custom:
///   region: us
///   _run: { duration: 12 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatsDocument {
    /// Host → status name → count
    #[serde(default)]
    pub hosts: IndexMap<String, BTreeMap<String, u64>>,
    /// Custom metrics; `_run` holds run-level metrics
    #[serde(default)]
    pub custom: BTreeMap<String, JsonValue>,
}

impl RunStatsDocument {
    /// Parse a JSON document.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Parse a YAML document.
    pub fn from_yaml(content: &str) -> serde_yaml::Result<Self> {
        serde_yaml::from_str(content)
    }

    /// Validate the counters and build [`RunStats`].
    ///
    /// Column and grand totals across hosts must fit in a `u64`.
    pub fn into_run_stats(self, policy: MissingCountPolicy) -> Result<RunStats> {
        let mut hosts = IndexMap::with_capacity(self.hosts.len());
        let mut columns = [0u64; 7];
        let mut grand = 0u64;
        for (host, counters) in &self.hosts {
            let stats = HostStats::from_counters(host, counters, policy)?;
            for (column, (_, count)) in columns.iter_mut().zip(stats.iter()) {
                *column = column
                    .checked_add(count)
                    .ok_or_else(|| Error::malformed(host, "counter overflow in run totals"))?;
            }
            grand = grand
                .checked_add(stats.total())
                .ok_or_else(|| Error::malformed(host, "counter overflow in run totals"))?;
            hosts.insert(host.clone(), stats);
        }
        Ok(RunStats {
            hosts,
            custom: self.custom,
        })
    }
}

impl From<&RunStats> for RunStatsDocument {
    fn from(stats: &RunStats) -> Self {
        let hosts = stats
            .hosts()
            .map(|(host, counters)| {
                let map = counters
                    .iter()
                    .map(|(kind, count)| (kind.as_str().to_string(), count))
                    .collect();
                (host.to_string(), map)
            })
            .collect();
        Self {
            hosts,
            custom: stats.custom.clone(),
        }
    }
}

// ============================================================================
// Lifecycle Events
// ============================================================================

/// Lifecycle notifications delivered by the execution engine, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A run is starting.
    RunStart {
        /// Whether this is a check-mode (dry) run
        #[serde(default)]
        check_mode: bool,
    },

    /// A play is starting.
    PlayStart {
        /// Play name
        name: String,
    },

    /// A task is starting (once per task, before any host).
    TaskStart {
        /// Unique task identifier
        task_id: String,
        /// Human-readable task name
        name: String,
        /// Configured retry count when the task has a retry loop
        #[serde(default)]
        retries: Option<u32>,
    },

    /// A task is starting on one host.
    HostTaskStart {
        /// Host identifier
        host: String,
        /// Task identifier
        task_id: String,
    },

    /// A retry-loop attempt failed and the task will run again.
    Retry {
        /// Host identifier
        host: String,
        /// Task identifier
        task_id: String,
        /// Attempt that just failed (1-based)
        attempt: u32,
        /// Configured retry count
        retries: u32,
    },

    /// Task completed without changes on a host.
    HostOk {
        /// Host identifier
        host: String,
        /// Task identifier
        task_id: String,
        /// Attempts used when the task has a retry loop
        #[serde(default)]
        attempts: Option<u32>,
    },

    /// Task completed with changes on a host.
    HostChanged {
        /// Host identifier
        host: String,
        /// Task identifier
        task_id: String,
        /// Attempts used when the task has a retry loop
        #[serde(default)]
        attempts: Option<u32>,
    },

    /// Task failed on a host.
    HostFailed {
        /// Host identifier
        host: String,
        /// Task identifier
        task_id: String,
        /// Attempts used when the task has a retry loop
        #[serde(default)]
        attempts: Option<u32>,
        /// Host the task was delegated to
        #[serde(default)]
        delegated_to: Option<String>,
        /// Raw module result
        #[serde(default)]
        result: JsonValue,
        /// Whether the failure is ignored
        #[serde(default)]
        ignore_errors: bool,
    },

    /// Task was skipped on a host.
    HostSkipped {
        /// Host identifier
        host: String,
        /// Task identifier
        task_id: String,
    },

    /// Host could not be reached for a task.
    HostUnreachable {
        /// Host identifier
        host: String,
        /// Task identifier
        task_id: String,
        /// Raw connection result
        #[serde(default)]
        result: JsonValue,
    },

    /// The run finished; carries the final counters.
    RunEnd {
        /// Final per-host statistics
        stats: RunStatsDocument,
    },
}

impl LifecycleEvent {
    /// Returns the event type name as a string.
    pub fn event_type(&self) -> &'static str {
        match self {
            LifecycleEvent::RunStart { .. } => "run_start",
            LifecycleEvent::PlayStart { .. } => "play_start",
            LifecycleEvent::TaskStart { .. } => "task_start",
            LifecycleEvent::HostTaskStart { .. } => "host_task_start",
            LifecycleEvent::Retry { .. } => "retry",
            LifecycleEvent::HostOk { .. } => "host_ok",
            LifecycleEvent::HostChanged { .. } => "host_changed",
            LifecycleEvent::HostFailed { .. } => "host_failed",
            LifecycleEvent::HostSkipped { .. } => "host_skipped",
            LifecycleEvent::HostUnreachable { .. } => "host_unreachable",
            LifecycleEvent::RunEnd { .. } => "run_end",
        }
    }

    /// Returns the host associated with this event, if any.
    pub fn host(&self) -> Option<&str> {
        match self {
            LifecycleEvent::HostTaskStart { host, .. }
            | LifecycleEvent::Retry { host, .. }
            | LifecycleEvent::HostOk { host, .. }
            | LifecycleEvent::HostChanged { host, .. }
            | LifecycleEvent::HostFailed { host, .. }
            | LifecycleEvent::HostSkipped { host, .. }
            | LifecycleEvent::HostUnreachable { host, .. } => Some(host),
            _ => None,
        }
    }

    /// Parse one JSON-lines record.
    pub fn from_json_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}
