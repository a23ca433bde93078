//! Rich Callback for Playrecap
//!
//! The event consumer: routes every [`LifecycleEvent`] to banners, per-host
//! result lines, the retry-loop progress bars and finally the recap.
//!
//! # Example Output
//!
//! ```text
//! PLAY T=14:02:11 [webservers] ***************************************************
//!
//! TASK T+   0.01s [wait for port] *************************************************
//! ⠋ [web1] 2 of 5
//! ok: [web1]
//! fatal: [web2 -> bastion]: FAILED! => {"msg":"timeout"}
//! ```
//!
//! Without progress bars, retries are shown on a single overprinted line:
//!
//! ```text
//! FAILED - RETRYING: [web1]: wait for port (2 of 5)
//! ```

use std::collections::HashMap;
use std::time::Instant;

use chrono::Local;
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use crate::callback::config::RecapConfig;
use crate::callback::display::{Delivery, Display};
use crate::callback::plugins::progress::ProgressTracker;
use crate::callback::plugins::recap::RecapRenderer;
use crate::callback::theme::Style;
use crate::callback::types::{LifecycleEvent, RunStatsDocument, StatusKind};
use crate::error::Result;
use crate::output::format_elapsed;

/// What the callback remembers about a started task.
#[derive(Debug, Clone)]
struct TaskInfo {
    name: String,
    retries: Option<u32>,
}

/// Console and log output for a whole run.
///
/// # Usage
///
/// ```rust,ignore
/// use playrecap::callback::prelude::*;
///
/// let config = RecapConfig::default();
/// let mut callback = RichCallback::from_config(&config, Display::stdout())?;
/// for event in events {
///     callback.dispatch(&event)?;
/// }
/// ```
#[derive(Debug)]
pub struct RichCallback {
    display: Display,
    renderer: RecapRenderer,
    tracker: Option<ProgressTracker>,
    check_mode: bool,
    started: Instant,
    play_started: Option<Instant>,
    tasks: HashMap<String, TaskInfo>,
}

impl RichCallback {
    /// Assemble a callback from its parts. `tracker` is `None` when retries
    /// should be shown on an overprinted line instead of progress bars.
    pub fn new(display: Display, renderer: RecapRenderer, tracker: Option<ProgressTracker>) -> Self {
        Self {
            display,
            renderer,
            tracker,
            check_mode: false,
            started: Instant::now(),
            play_started: None,
            tasks: HashMap::new(),
        }
    }

    /// Build a callback from configuration, styling `display` with the
    /// configured theme, colors and width.
    pub fn from_config(config: &RecapConfig, display: Display) -> Result<Self> {
        let theme = config.theme()?;
        let display = display
            .with_theme(theme.clone())
            .with_color(config.use_colors)
            .with_width(config.width);
        let renderer = RecapRenderer::new(theme, config.recap_options());
        let tracker = if config.progress {
            Some(ProgressTracker::new(config.progress_config())?)
        } else {
            None
        };
        Ok(Self::new(display, renderer, tracker))
    }

    /// Mark the run as a dry run up front.
    pub fn with_check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }

    /// Whether the run is a dry run.
    pub fn is_check_mode(&self) -> bool {
        self.check_mode
    }

    /// The display.
    pub fn display(&self) -> &Display {
        &self.display
    }

    /// The recap renderer.
    pub fn renderer(&self) -> &RecapRenderer {
        &self.renderer
    }

    /// The progress tracker, when progress bars are enabled.
    pub fn tracker(&self) -> Option<&ProgressTracker> {
        self.tracker.as_ref()
    }

    /// Flush the screen and the log.
    pub fn flush(&mut self) -> Result<()> {
        self.display.flush()
    }

    /// Handle one lifecycle event.
    pub fn dispatch(&mut self, event: &LifecycleEvent) -> Result<()> {
        trace!(event = event.event_type(), host = ?event.host(), "dispatching");
        match event {
            LifecycleEvent::RunStart { check_mode } => self.on_run_start(*check_mode),
            LifecycleEvent::PlayStart { name } => self.on_play_start(name),
            LifecycleEvent::TaskStart {
                task_id,
                name,
                retries,
            } => self.on_task_start(task_id, name, *retries),
            LifecycleEvent::HostTaskStart { host, task_id } => {
                self.on_host_task_start(host, task_id)
            }
            LifecycleEvent::Retry {
                host,
                task_id,
                attempt,
                retries,
            } => self.on_retry(host, task_id, *attempt, *retries),
            LifecycleEvent::HostOk {
                host,
                task_id,
                attempts,
            } => {
                self.finish_handle(host, task_id, *attempts)?;
                self.result_line("ok", host, StatusKind::Ok)
            }
            LifecycleEvent::HostChanged {
                host,
                task_id,
                attempts,
            } => {
                self.finish_handle(host, task_id, *attempts)?;
                self.result_line("changed", host, StatusKind::Changed)
            }
            LifecycleEvent::HostFailed {
                host,
                task_id,
                attempts,
                delegated_to,
                result,
                ignore_errors,
            } => {
                self.finish_handle(host, task_id, *attempts)?;
                self.on_failed(host, delegated_to.as_deref(), result, *ignore_errors)
            }
            LifecycleEvent::HostSkipped { host, task_id } => {
                self.finish_handle(host, task_id, None)?;
                self.result_line("skipping", host, StatusKind::Skipped)
            }
            LifecycleEvent::HostUnreachable {
                host,
                task_id,
                result,
            } => {
                self.finish_handle(host, task_id, None)?;
                let line = format!("fatal: [{}]: UNREACHABLE! => {}", host, compact(result));
                self.display.display(
                    &line,
                    Style::Status(StatusKind::Unreachable),
                    Delivery::Both,
                )
            }
            LifecycleEvent::RunEnd { stats } => self.on_run_end(stats),
        }
    }

    fn on_run_start(&mut self, check_mode: bool) -> Result<()> {
        self.check_mode = check_mode;
        self.started = Instant::now();
        if check_mode && self.renderer.options().check_mode_markers {
            self.display.banner("DRY RUN")?;
        }
        Ok(())
    }

    fn on_play_start(&mut self, name: &str) -> Result<()> {
        self.play_started = Some(Instant::now());
        let title = format!("PLAY T={} [{}]", Local::now().format("%H:%M:%S"), name);
        self.display.banner(&title)
    }

    fn on_task_start(&mut self, task_id: &str, name: &str, retries: Option<u32>) -> Result<()> {
        self.tasks.insert(
            task_id.to_string(),
            TaskInfo {
                name: name.to_string(),
                retries,
            },
        );

        let since = self.play_started.unwrap_or(self.started);
        let title = format!("TASK T+{} [{}]", format_elapsed(since.elapsed()), name);
        self.display.banner(&title)?;

        if let Some(tracker) = self.tracker.as_mut() {
            tracker.on_task_start(task_id, retries.is_some())?;
        }
        Ok(())
    }

    fn on_host_task_start(&mut self, host: &str, task_id: &str) -> Result<()> {
        let retries = self.tasks.get(task_id).and_then(|task| task.retries);
        if let (Some(tracker), Some(retries)) = (self.tracker.as_mut(), retries) {
            tracker.on_host_task_begin(host, task_id, u64::from(retries))?;
        }
        Ok(())
    }

    fn on_retry(&mut self, host: &str, task_id: &str, attempt: u32, retries: u32) -> Result<()> {
        let task = self.tasks.get(task_id);
        let has_retry_loop = task.is_some_and(|task| task.retries.is_some());
        let name = task.map(|task| task.name.as_str()).unwrap_or(task_id);
        let line = format!("FAILED - RETRYING: [{host}]: {name} ({attempt} of {retries})");

        match self.tracker.as_mut() {
            Some(tracker) if has_retry_loop => {
                tracker.on_retry(host, task_id)?;
            }
            _ => self.display.overprint(&line, Style::Dim, attempt >= retries)?,
        }
        self.display.display(&line, Style::Dim, Delivery::LogOnly)
    }

    /// Close the progress bar of (host, task) when one is live.
    fn finish_handle(&mut self, host: &str, task_id: &str, attempts: Option<u32>) -> Result<()> {
        let Some(tracker) = self.tracker.as_mut() else {
            return Ok(());
        };
        let Some(handle) = tracker.handle(host, task_id) else {
            return Ok(());
        };
        let last = attempts
            .map(u64::from)
            .unwrap_or(handle.snapshot().completed + 1);
        let snapshot = tracker.on_terminal_result(host, task_id, last)?;
        debug!(host = %host, task = %task_id, attempts = snapshot.total, "retry loop finished");
        Ok(())
    }

    fn result_line(&mut self, label: &str, host: &str, kind: StatusKind) -> Result<()> {
        let line = format!("{label}: [{host}]");
        self.display.display(&line, Style::Status(kind), Delivery::Both)
    }

    fn on_failed(
        &mut self,
        host: &str,
        delegated_to: Option<&str>,
        result: &JsonValue,
        ignore_errors: bool,
    ) -> Result<()> {
        let target = match delegated_to {
            Some(delegate) => format!("{host} -> {delegate}"),
            None => host.to_string(),
        };
        let line = format!("fatal: [{}]: FAILED! => {}", target, compact(result));
        self.display.display(&line, Style::Error, Delivery::Both)?;
        if ignore_errors {
            self.display.display(
                "...ignoring",
                Style::Status(StatusKind::Ignored),
                Delivery::Both,
            )?;
        }
        Ok(())
    }

    fn on_run_end(&mut self, stats: &RunStatsDocument) -> Result<()> {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.finish_all()?;
        }
        let output = self.renderer.render_document(stats.clone(), self.check_mode)?;
        output.emit(&mut self.display)
    }
}

/// Module results on one line; a missing result shows as `{}`.
fn compact(result: &JsonValue) -> String {
    if result.is_null() {
        "{}".to_string()
    } else {
        result.to_string()
    }
}
