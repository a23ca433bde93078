//! Retry-Loop Progress Bars for Playrecap
//!
//! Tracks the attempts of tasks that run in a retry loop (`until`/`retries`)
//! and shows one transient progress bar per (host, task) while the loop is
//! active.
//!
//! # Lifecycle
//!
//! 1. [`ProgressTracker::on_task_start`] creates the task's display when the
//!    task has a retry loop
//! 2. [`ProgressTracker::on_host_task_begin`] adds a bar for a host
//! 3. [`ProgressTracker::on_retry`] advances the bar by one attempt
//! 4. [`ProgressTracker::on_terminal_result`] sets the final attempt count
//!    and removes the bar; the display is torn down with the task's last bar
//!
//! # Example Output
//!
//! ```text
//! ⠋ [web1] 2 of 5
//! ⠙ [web2] 4 of 5
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use indexmap::IndexMap;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result, SinkKind};

// ============================================================================
// Configuration
// ============================================================================

/// Default bar template: spinner, host, attempts.
pub const DEFAULT_TEMPLATE: &str = "{spinner:.cyan} [{prefix}] {pos} of {len}";

/// Default steady-tick interval.
pub const DEFAULT_TICK_MS: u64 = 100;

/// When bars are redrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Redraw explicitly after every update
    Immediate,
    /// Redraw on a background tick
    Steady {
        /// Tick interval in milliseconds
        interval_ms: u64,
    },
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        RefreshPolicy::Steady {
            interval_ms: DEFAULT_TICK_MS,
        }
    }
}

/// Where bars are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawTarget {
    /// Standard error
    #[default]
    Stderr,
    /// Standard output
    Stdout,
    /// Nowhere; state is still tracked
    Hidden,
}

impl DrawTarget {
    fn to_indicatif(self) -> ProgressDrawTarget {
        match self {
            DrawTarget::Stderr => ProgressDrawTarget::stderr(),
            DrawTarget::Stdout => ProgressDrawTarget::stdout(),
            DrawTarget::Hidden => ProgressDrawTarget::hidden(),
        }
    }
}

impl fmt::Display for DrawTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawTarget::Stderr => f.write_str("stderr"),
            DrawTarget::Stdout => f.write_str("stdout"),
            DrawTarget::Hidden => f.write_str("hidden"),
        }
    }
}

impl FromStr for DrawTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "stderr" => Ok(DrawTarget::Stderr),
            "stdout" => Ok(DrawTarget::Stdout),
            "hidden" | "none" => Ok(DrawTarget::Hidden),
            other => Err(Error::Config(format!("unknown draw target '{other}'"))),
        }
    }
}

/// Configuration for the progress tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressConfig {
    /// Redraw policy
    pub refresh: RefreshPolicy,
    /// Output target
    pub draw_target: DrawTarget,
    /// indicatif template for each bar
    pub template: String,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            refresh: RefreshPolicy::default(),
            draw_target: DrawTarget::default(),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl ProgressConfig {
    /// Hidden bars with immediate refresh, for tests and non-interactive runs.
    pub fn hidden() -> Self {
        Self {
            refresh: RefreshPolicy::Immediate,
            draw_target: DrawTarget::Hidden,
            ..Self::default()
        }
    }
}

// ============================================================================
// Handles
// ============================================================================

/// Attempt counters of one handle after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Attempts made so far
    pub completed: u64,
    /// Attempts allowed, or made once finished
    pub total: u64,
}

/// The bar of one host within one retrying task.
#[derive(Debug)]
pub struct ProgressHandle {
    host: String,
    task_id: String,
    completed: u64,
    total: u64,
    bar: ProgressBar,
}

impl ProgressHandle {
    /// Host this handle belongs to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Task this handle belongs to.
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Current counters.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed,
            total: self.total,
        }
    }

    fn sync_bar(&self) {
        self.bar.set_length(self.total);
        self.bar.set_position(self.completed);
    }
}

/// Display of one task: a bar container plus its live handles.
#[derive(Debug)]
struct TaskProgress {
    multi: MultiProgress,
    handles: IndexMap<String, ProgressHandle>,
}

impl TaskProgress {
    fn new(target: DrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target.to_indicatif()),
            handles: IndexMap::new(),
        }
    }

    fn teardown(self) -> Result<()> {
        for (_, handle) in self.handles {
            handle.bar.finish_and_clear();
        }
        self.multi
            .clear()
            .map_err(|e| Error::sink(SinkKind::Screen, e))
    }
}

// ============================================================================
// Tracker
// ============================================================================

/// Tracks retry-loop progress per (host, task).
///
/// # Usage
///
/// ```rust,ignore
/// use playrecap::callback::prelude::*;
///
/// let mut tracker = ProgressTracker::new(ProgressConfig::default())?;
/// tracker.on_task_start("t1", true)?;
/// tracker.on_host_task_begin("web1", "t1", 5)?;
/// tracker.on_retry("web1", "t1")?;
/// tracker.on_terminal_result("web1", "t1", 2)?;
/// ```
pub struct ProgressTracker {
    config: ProgressConfig,
    style: ProgressStyle,
    tasks: IndexMap<String, TaskProgress>,
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("config", &self.config)
            .field("tasks", &self.tasks)
            .finish()
    }
}

impl ProgressTracker {
    /// Create a tracker. Fails when the bar template does not parse.
    pub fn new(config: ProgressConfig) -> Result<Self> {
        let style = ProgressStyle::with_template(&config.template)
            .map_err(|e| Error::Config(format!("invalid progress template: {e}")))?;
        Ok(Self {
            config,
            style,
            tasks: IndexMap::new(),
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    /// Prepare the display of a task with a retry loop.
    ///
    /// No-op for tasks without one and for tasks already displayed. Displays
    /// of earlier tasks that have no bars left are torn down first.
    pub fn on_task_start(&mut self, task_id: &str, has_retry_loop: bool) -> Result<()> {
        if !has_retry_loop || self.tasks.contains_key(task_id) {
            return Ok(());
        }
        self.teardown_idle()?;
        debug!(task = %task_id, "creating progress display");
        self.tasks
            .insert(task_id.to_string(), TaskProgress::new(self.config.draw_target));
        Ok(())
    }

    /// Add a bar for `host` running `task_id` with `retry_target` attempts.
    pub fn on_host_task_begin(
        &mut self,
        host: &str,
        task_id: &str,
        retry_target: u64,
    ) -> Result<ProgressSnapshot> {
        let target = self.config.draw_target;
        let policy = self.config.refresh;
        let task = self
            .tasks
            .entry(task_id.to_string())
            .or_insert_with(|| TaskProgress::new(target));

        if task.handles.contains_key(host) {
            return Err(Error::duplicate_handle(host, task_id));
        }

        let bar = task.multi.add(ProgressBar::new(retry_target));
        bar.set_style(self.style.clone());
        bar.set_prefix(host.to_string());
        if let RefreshPolicy::Steady { interval_ms } = policy {
            bar.enable_steady_tick(Duration::from_millis(interval_ms));
        }

        let handle = ProgressHandle {
            host: host.to_string(),
            task_id: task_id.to_string(),
            completed: 0,
            total: retry_target,
            bar,
        };
        refresh(policy, &handle);
        let snapshot = handle.snapshot();
        task.handles.insert(host.to_string(), handle);

        trace!(host = %host, task = %task_id, total = retry_target, "progress handle created");
        Ok(snapshot)
    }

    /// Count one more attempt for `host` on `task_id`.
    pub fn on_retry(&mut self, host: &str, task_id: &str) -> Result<ProgressSnapshot> {
        let policy = self.config.refresh;
        let handle = self
            .tasks
            .get_mut(task_id)
            .and_then(|task| task.handles.get_mut(host))
            .ok_or_else(|| Error::unknown_handle(host, task_id))?;

        if handle.completed >= handle.total {
            warn!(
                host = %host,
                task = %task_id,
                total = handle.total,
                "retry reported beyond the retry limit"
            );
        } else {
            handle.completed += 1;
        }
        refresh(policy, handle);
        Ok(handle.snapshot())
    }

    /// Finish the bar of `host` on `task_id` with the final attempt count.
    pub fn on_terminal_result(
        &mut self,
        host: &str,
        task_id: &str,
        final_attempts: u64,
    ) -> Result<ProgressSnapshot> {
        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::unknown_handle(host, task_id))?;
        let mut handle = task
            .handles
            .shift_remove(host)
            .ok_or_else(|| Error::unknown_handle(host, task_id))?;

        handle.total = final_attempts;
        handle.completed = handle.completed.min(final_attempts);
        handle.sync_bar();
        handle.bar.finish_and_clear();
        task.multi.remove(&handle.bar);
        let snapshot = handle.snapshot();

        if task.handles.is_empty() {
            if let Some(task) = self.tasks.shift_remove(task_id) {
                debug!(task = %task_id, "tearing down progress display");
                task.teardown()?;
            }
        }
        Ok(snapshot)
    }

    /// Live handle for (host, task), if any.
    pub fn handle(&self, host: &str, task_id: &str) -> Option<&ProgressHandle> {
        self.tasks.get(task_id).and_then(|task| task.handles.get(host))
    }

    /// Whether (host, task) has a live handle.
    pub fn is_tracking(&self, host: &str, task_id: &str) -> bool {
        self.handle(host, task_id).is_some()
    }

    /// Whether a display exists for the task.
    pub fn has_display(&self, task_id: &str) -> bool {
        self.tasks.contains_key(task_id)
    }

    /// Number of live handles across all tasks.
    pub fn active_handles(&self) -> usize {
        self.tasks.values().map(|task| task.handles.len()).sum()
    }

    /// Clear every bar and display.
    pub fn finish_all(&mut self) -> Result<()> {
        for (_, task) in self.tasks.drain(..) {
            task.teardown()?;
        }
        Ok(())
    }

    fn teardown_idle(&mut self) -> Result<()> {
        let idle: Vec<String> = self
            .tasks
            .iter()
            .filter(|(_, task)| task.handles.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        for id in idle {
            if let Some(task) = self.tasks.shift_remove(&id) {
                task.teardown()?;
            }
        }
        Ok(())
    }
}

fn refresh(policy: RefreshPolicy, handle: &ProgressHandle) {
    handle.sync_bar();
    if policy == RefreshPolicy::Immediate {
        handle.bar.tick();
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain(..) {
            let _ = task.teardown();
        }
    }
}
