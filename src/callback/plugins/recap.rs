//! Recap Renderer for Playrecap
//!
//! Turns the finalized [`RunStats`] of a run into two independent
//! renderings:
//!
//! - a **screen** rendering, colorized and optionally glyphed, laid out as a
//!   table or as one inline line per host
//! - a **log** rendering, free of styling, always in the inline layout
//!
//! Both list hosts in sorted order with a row total, followed by a footer
//! carrying the column totals and the grand total. Custom statistics and
//! the `DRY RUN` marker come after the recap.
//!
//! # Example Output (table layout)
//!
//! ```text
//! PLAY RECAP *********************************************************************
//! Host   Ok  Changed  Unreachable  Failed  Skipped  Rescued  Ignored  Total
//! ─────  ──  ───────  ───────────  ──────  ───────  ───────  ───────  ─────
//! web1    5        2            0       0        1        0        0      8
//! web2    6        1            0       1        0        0        0      8
//! ─────  ──  ───────  ───────────  ──────  ───────  ───────  ───────  ─────
//! Total  11        3            0       1        1        0        0     16
//! ```
//!
//! # Example Output (log)
//!
//! ```text
//! web1                       : ok=5    changed=2    unreachable=0    failed=0    skipped=1    rescued=0    ignored=0    total=8
//! ```
//!
//! The renderer is pure: the same input always produces byte-identical
//! output. Writing to the sinks is done by [`RecapOutput::emit`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::callback::display::{Display, LogLine};
use crate::callback::theme::{Style, Theme, ZeroDisplay};
use crate::callback::types::{HostStats, MissingCountPolicy, RunStats, RunStatsDocument, StatusKind};
use crate::error::{Error, Result};
use crate::output::{format_banner, format_value, OUTPUT_WIDTH};

/// Width the host column is padded to in inline lines.
const INLINE_HOST_WIDTH: usize = 26;

/// Width counts are padded to in inline lines.
const INLINE_COUNT_WIDTH: usize = 4;

/// Label of the footer row.
const TOTAL_LABEL: &str = "Total";

/// Space between table columns.
const COLUMN_GAP: &str = "  ";

// ============================================================================
// Configuration
// ============================================================================

/// Screen layout of the recap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecapLayout {
    /// Aligned columns with header, rules and footer
    #[default]
    Table,
    /// `host : ok=N changed=N ...` per host
    Inline,
}

impl fmt::Display for RecapLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecapLayout::Table => f.write_str("table"),
            RecapLayout::Inline => f.write_str("inline"),
        }
    }
}

impl FromStr for RecapLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(RecapLayout::Table),
            "inline" => Ok(RecapLayout::Inline),
            other => Err(Error::Config(format!("unknown recap layout '{other}'"))),
        }
    }
}

/// Options for the recap renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RecapOptions {
    /// Screen layout
    pub layout: RecapLayout,
    /// How zero counts look on screen
    pub zero_display: ZeroDisplay,
    /// Whether to render custom statistics
    pub show_custom: bool,
    /// Whether dry runs get a `DRY RUN` marker
    pub check_mode_markers: bool,
    /// Whether the screen rendering carries escape codes
    pub use_color: bool,
    /// Banner width
    pub width: usize,
    /// How incomplete counter sets are treated by [`RecapRenderer::render_document`]
    pub missing_counts: MissingCountPolicy,
}

impl Default for RecapOptions {
    fn default() -> Self {
        Self {
            layout: RecapLayout::Table,
            zero_display: ZeroDisplay::Dimmed,
            show_custom: false,
            check_mode_markers: true,
            use_color: true,
            width: OUTPUT_WIDTH,
            missing_counts: MissingCountPolicy::Reject,
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Result of rendering a recap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecapOutput {
    /// Screen text, one line per `\n`, possibly with escape codes
    pub screen: String,
    /// Plain log lines
    pub log: Vec<LogLine>,
}

impl RecapOutput {
    /// The log lines joined with newlines.
    pub fn log_text(&self) -> String {
        let mut text = String::new();
        for line in &self.log {
            text.push_str(&line.text);
            text.push('\n');
        }
        text
    }

    /// Write the screen block and the log lines through `display`.
    pub fn emit(&self, display: &mut Display) -> Result<()> {
        display.write_screen_block(&self.screen)?;
        display.write_log_lines(&self.log)?;
        display.flush()
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Column and grand totals accumulated over every host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecapTotals {
    columns: HostStats,
    grand: u64,
}

impl RecapTotals {
    /// Sum the counters of every host.
    pub fn from_stats(stats: &RunStats) -> Self {
        let mut totals = Self::default();
        for (_, host) in stats.hosts() {
            totals.add(host);
        }
        totals
    }

    /// Totals saturate at `u64::MAX`; documents that would overflow are
    /// rejected earlier by [`RunStatsDocument::into_run_stats`].
    fn add(&mut self, host: &HostStats) {
        for (kind, count) in host.iter() {
            let sum = self.columns.get(kind).saturating_add(count);
            self.columns = self.columns.with(kind, sum);
        }
        self.grand = self.grand.saturating_add(host.total());
    }

    /// Column total for one status.
    pub fn get(&self, kind: StatusKind) -> u64 {
        self.columns.get(kind)
    }

    /// Sum over all hosts and statuses.
    pub fn grand_total(&self) -> u64 {
        self.grand
    }

    /// Column totals as host-shaped counters.
    pub fn as_host_stats(&self) -> &HostStats {
        &self.columns
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Horizontal alignment of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

/// A table cell: plain text for measuring, style for painting.
#[derive(Debug, Clone)]
struct Cell {
    text: String,
    style: Style,
}

impl Cell {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Renders recaps with a fixed theme and options.
///
/// # Usage
///
/// ```rust,ignore
/// use playrecap::callback::prelude::*;
///
/// let renderer = RecapRenderer::new(Theme::new(GlyphSet::Signs), RecapOptions::default());
/// let output = renderer.render(&stats, false);
/// output.emit(&mut display)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecapRenderer {
    theme: Theme,
    options: RecapOptions,
}

impl Default for RecapRenderer {
    fn default() -> Self {
        Self::new(Theme::default(), RecapOptions::default())
    }
}

impl RecapRenderer {
    /// Create a renderer.
    pub fn new(theme: Theme, options: RecapOptions) -> Self {
        Self { theme, options }
    }

    /// Theme in use.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Options in use.
    pub fn options(&self) -> &RecapOptions {
        &self.options
    }

    /// Validate a stats document under the configured missing-count policy
    /// and render it.
    pub fn render_document(&self, doc: RunStatsDocument, is_dry_run: bool) -> Result<RecapOutput> {
        let stats = doc.into_run_stats(self.options.missing_counts)?;
        Ok(self.render(&stats, is_dry_run))
    }

    /// Render screen and log output for a run.
    pub fn render(&self, stats: &RunStats, is_dry_run: bool) -> RecapOutput {
        let hosts = stats.sorted_hosts();
        let totals = RecapTotals::from_stats(stats);
        debug!(
            hosts = hosts.len(),
            grand_total = totals.grand_total(),
            layout = %self.options.layout,
            "rendering recap"
        );

        let mut screen: Vec<String> = Vec::new();
        let mut log: Vec<LogLine> = Vec::new();

        self.push_banner(&mut screen, &mut log, "PLAY RECAP");

        match self.options.layout {
            RecapLayout::Table => screen.extend(self.table_lines(&hosts, &totals)),
            RecapLayout::Inline => screen.extend(self.inline_lines(&hosts, &totals)),
        }

        for (host, host_stats) in &hosts {
            log.push(LogLine::info(plain_line(host, host_stats, host_stats.total())));
        }
        log.push(LogLine::info(plain_line(
            TOTAL_LABEL,
            totals.as_host_stats(),
            totals.grand_total(),
        )));

        if self.options.show_custom && !stats.custom().is_empty() {
            self.push_custom(&mut screen, &mut log, stats);
        }

        if is_dry_run && self.options.check_mode_markers {
            self.push_banner(&mut screen, &mut log, "DRY RUN");
        }

        let mut text = screen.join("\n");
        text.push('\n');
        RecapOutput { screen: text, log }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        self.theme.paint(text, style, self.options.use_color)
    }

    fn push_banner(&self, screen: &mut Vec<String>, log: &mut Vec<LogLine>, title: &str) {
        if screen.last().is_some_and(|line| !line.is_empty()) {
            screen.push(String::new());
        }
        let banner = format_banner(title, self.options.width);
        screen.push(self.paint(&banner, Style::Banner));
        log.push(LogLine::info(banner));
    }

    fn push_custom(&self, screen: &mut Vec<String>, log: &mut Vec<LogLine>, stats: &RunStats) {
        self.push_banner(screen, log, "CUSTOM STATS:");

        for (key, value) in stats.host_custom() {
            let line = format!("\t{}: {}", key, format_value(value));
            screen.push(line.clone());
            log.push(LogLine::info(line));
        }

        if let Some(run) = stats.run_custom() {
            screen.push(String::new());
            for line in run_custom_lines(run) {
                screen.push(self.paint(&line, Style::Banner));
                log.push(LogLine::info(line));
            }
        }
    }

    /// Status cell: count in the status color, zero per the zero policy.
    fn count_cell(&self, kind: StatusKind, count: u64) -> Cell {
        let (text, dim) = self.options.zero_display.cell(count);
        let style = if dim { Style::Dim } else { Style::Status(kind) };
        Cell::new(text, style)
    }

    fn table_lines(&self, hosts: &[(&str, &HostStats)], totals: &RecapTotals) -> Vec<String> {
        let mut header = vec![Cell::new("Host", Style::Banner)];
        header.extend(
            StatusKind::ALL
                .iter()
                .map(|kind| Cell::new(self.theme.entry(*kind).heading(), Style::Banner)),
        );
        header.push(Cell::new(TOTAL_LABEL, Style::Banner));

        let row = |label: &str, counters: &HostStats, total: u64| {
            let mut cells = vec![Cell::new(label, Style::Plain)];
            cells.extend(
                StatusKind::ALL
                    .iter()
                    .map(|kind| self.count_cell(*kind, counters.get(*kind))),
            );
            cells.push(Cell::new(total.to_string(), Style::Plain));
            cells
        };

        let rows: Vec<Vec<Cell>> = hosts
            .iter()
            .map(|(host, stats)| row(host, stats, stats.total()))
            .collect();
        let footer = row(TOTAL_LABEL, totals.as_host_stats(), totals.grand_total());

        let mut widths: Vec<usize> = header.iter().map(|c| text_width(&c.text)).collect();
        for cells in rows.iter().chain(std::iter::once(&footer)) {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(text_width(&cell.text));
            }
        }

        let rule = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);

        let mut lines = Vec::with_capacity(rows.len() + 4);
        lines.push(self.table_row(&header, &widths, |_| Align::Center));
        lines.push(rule.clone());
        for cells in &rows {
            lines.push(self.table_row(cells, &widths, body_align));
        }
        lines.push(rule);
        lines.push(self.table_row(&footer, &widths, body_align));
        lines
    }

    fn table_row(&self, cells: &[Cell], widths: &[usize], align: impl Fn(usize) -> Align) -> String {
        let rendered: Vec<String> = cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(column, (cell, width))| {
                let painted = self.paint(&cell.text, cell.style);
                pad(&cell.text, &painted, *width, align(column))
            })
            .collect();
        rendered.join(COLUMN_GAP).trim_end().to_string()
    }

    fn inline_lines(&self, hosts: &[(&str, &HostStats)], totals: &RecapTotals) -> Vec<String> {
        let mut lines = Vec::with_capacity(hosts.len() + 1);
        for (host, stats) in hosts {
            let name = self.paint(host, Style::Status(stats.tone()));
            lines.push(self.inline_line(host, &name, stats, stats.total()));
        }
        let label = self.paint(TOTAL_LABEL, Style::Banner);
        lines.push(self.inline_line(
            TOTAL_LABEL,
            &label,
            totals.as_host_stats(),
            totals.grand_total(),
        ));
        lines
    }

    fn inline_line(&self, plain: &str, painted: &str, stats: &HostStats, total: u64) -> String {
        let mut parts = Vec::with_capacity(8);
        for (kind, count) in stats.iter() {
            let entry = self.theme.entry(kind);
            let cell = self.count_cell(kind, count);
            let text = format!("{}={}", entry.label, cell.text);
            let padded_width = entry.label.len() + 1 + INLINE_COUNT_WIDTH;
            let mut part = String::new();
            if !entry.glyph.is_empty() {
                part.push_str(entry.glyph);
                part.push(' ');
            }
            part.push_str(&pad(&text, &self.paint(&text, cell.style), padded_width, Align::Left));
            parts.push(part);
        }
        parts.push(format!("total={total}"));

        let host = pad(plain, painted, INLINE_HOST_WIDTH, Align::Left);
        format!("{} : {}", host, parts.join(" ")).trim_end().to_string()
    }
}

/// Render a recap with the default theme: table layout, colors on.
///
/// See [`RecapRenderer`] for control over layout, glyphs and zero counts.
pub fn render_recap(stats: &RunStats, show_custom: bool, is_dry_run: bool) -> RecapOutput {
    let options = RecapOptions {
        show_custom,
        ..RecapOptions::default()
    };
    RecapRenderer::new(Theme::default(), options).render(stats, is_dry_run)
}

/// Column alignment for body rows: host left, counts right.
fn body_align(column: usize) -> Align {
    if column == 0 {
        Align::Left
    } else {
        Align::Right
    }
}

fn text_width(text: &str) -> usize {
    console::measure_text_width(text)
}

/// Pad `painted` (whose visible text is `plain`) to `width` columns.
fn pad(plain: &str, painted: &str, width: usize, align: Align) -> String {
    let gap = width.saturating_sub(text_width(plain));
    match align {
        Align::Left => format!("{}{}", painted, " ".repeat(gap)),
        Align::Right => format!("{}{}", " ".repeat(gap), painted),
        Align::Center => {
            let left = gap / 2;
            format!("{}{}{}", " ".repeat(left), painted, " ".repeat(gap - left))
        }
    }
}

/// Styling-free `host : ok=N ...` line, as written to the log.
fn plain_line(host: &str, stats: &HostStats, total: u64) -> String {
    let cells: Vec<String> = stats
        .iter()
        .map(|(kind, count)| {
            format!(
                "{:<width$}",
                format!("{}={}", kind.as_str(), count),
                width = kind.as_str().len() + 1 + INLINE_COUNT_WIDTH
            )
        })
        .collect();
    format!(
        "{:<host_width$} : {} total={}",
        host,
        cells.join(" "),
        total,
        host_width = INLINE_HOST_WIDTH
    )
}

/// Lines for the run-level custom metrics: one per member when it is an
/// object, a single `RUN:` line otherwise.
fn run_custom_lines(value: &JsonValue) -> Vec<String> {
    match value {
        JsonValue::Object(members) => {
            let mut keys: Vec<&String> = members.keys().collect();
            keys.sort();
            keys.into_iter()
                .map(|key| format!("\tRUN {}: {}", key, format_value(&members[key])))
                .collect()
        }
        other => vec![format!("\tRUN: {}", format_value(other))],
    }
}
