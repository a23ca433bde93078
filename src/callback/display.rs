//! Screen and log sinks.
//!
//! A [`Display`] composes two independent targets: a screen (any
//! `io::Write`, usually stdout) and a log ([`LogSink`]). Each call chooses
//! its targets with a [`Delivery`]. Styling only reaches the screen; the log
//! receives the plain text at a level derived from the semantic [`Style`].
//!
//! Any rejected write surfaces as [`Error::SinkWriteFailure`] naming the
//! sink; nothing is dropped silently.

use std::fmt;
use std::io::{self, Write};

use chrono::Local;
use tracing::Level;

use crate::callback::theme::{Style, Theme};
use crate::callback::types::StatusKind;
use crate::error::{Error, Result, SinkKind};
use crate::output::{format_banner, OUTPUT_WIDTH};

/// Which sinks a line goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Screen and log
    Both,
    /// Screen only
    ScreenOnly,
    /// Log only
    LogOnly,
}

impl Delivery {
    fn to_screen(self) -> bool {
        !matches!(self, Delivery::LogOnly)
    }

    fn to_log(self) -> bool {
        !matches!(self, Delivery::ScreenOnly)
    }
}

/// Log level for a styled line.
pub fn log_level(style: Style) -> Level {
    match style {
        Style::Error | Style::Status(StatusKind::Failed | StatusKind::Unreachable) => Level::ERROR,
        Style::Status(StatusKind::Ignored) => Level::WARN,
        _ => Level::INFO,
    }
}

/// One line destined for the log sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Severity
    pub level: Level,
    /// Plain text, no escape codes
    pub text: String,
}

impl LogLine {
    /// Informational line.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: Level::INFO,
            text: text.into(),
        }
    }

    /// Line at the level matching `style`.
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            level: log_level(style),
            text: text.into(),
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ============================================================================
// Log Sinks
// ============================================================================

/// Durable destination for plain log lines.
pub trait LogSink {
    /// Record one line.
    fn log(&mut self, level: Level, line: &str) -> io::Result<()>;

    /// Flush buffered lines.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: LogSink + ?Sized> LogSink for Box<T> {
    fn log(&mut self, level: Level, line: &str) -> io::Result<()> {
        (**self).log(level, line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Forwards log lines to `tracing` under the `playrecap::log` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn log(&mut self, level: Level, line: &str) -> io::Result<()> {
        match level {
            Level::ERROR => tracing::error!(target: "playrecap::log", "{}", line),
            Level::WARN => tracing::warn!(target: "playrecap::log", "{}", line),
            Level::INFO => tracing::info!(target: "playrecap::log", "{}", line),
            Level::DEBUG => tracing::debug!(target: "playrecap::log", "{}", line),
            Level::TRACE => tracing::trace!(target: "playrecap::log", "{}", line),
        }
        Ok(())
    }
}

/// Writes `LEVEL | line` records to any writer, optionally timestamped.
#[derive(Debug)]
pub struct WriterLog<W: Write> {
    writer: W,
    timestamps: bool,
}

impl<W: Write> WriterLog<W> {
    /// Log into `writer` without timestamps.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            timestamps: false,
        }
    }

    /// Prefix each record with an RFC 3339 local timestamp.
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LogSink for WriterLog<W> {
    fn log(&mut self, level: Level, line: &str) -> io::Result<()> {
        if self.timestamps {
            write!(self.writer, "{} ", Local::now().to_rfc3339())?;
        }
        writeln!(self.writer, "{:<5} | {}", level.to_string(), line)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Discards every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl LogSink for NullLog {
    fn log(&mut self, _level: Level, _line: &str) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Display
// ============================================================================

/// Screen + log output with a shared theme.
pub struct Display {
    screen: Option<Box<dyn Write>>,
    log: Box<dyn LogSink>,
    theme: Theme,
    use_color: bool,
    width: usize,
    printed: bool,
    overprinting: bool,
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("screen", &self.screen.is_some())
            .field("theme", &self.theme)
            .field("use_color", &self.use_color)
            .field("width", &self.width)
            .field("printed", &self.printed)
            .finish()
    }
}

impl Display {
    /// Display writing to `screen` and `log`.
    pub fn new(screen: Box<dyn Write>, log: Box<dyn LogSink>) -> Self {
        Self {
            screen: Some(screen),
            log,
            theme: Theme::default(),
            use_color: true,
            width: OUTPUT_WIDTH,
            printed: false,
            overprinting: false,
        }
    }

    /// Display on stdout with logging through `tracing`.
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(TracingLog))
    }

    /// Display with no screen; everything goes to the log only.
    pub fn log_only(log: Box<dyn LogSink>) -> Self {
        Self {
            screen: None,
            ..Self::new(Box::new(io::sink()), log)
        }
    }

    /// Use `theme` for screen colors.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Enable or disable escape codes on the screen.
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Banner width.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Theme in use.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Whether screen output is colored.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Banner width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether anything has reached the screen yet.
    pub fn has_printed(&self) -> bool {
        self.printed
    }

    /// Write one line to the selected sinks.
    pub fn display(&mut self, msg: &str, style: Style, delivery: Delivery) -> Result<()> {
        if delivery.to_screen() {
            let painted = self.theme.paint(msg, style, self.use_color);
            self.write_screen(&painted, true)?;
        }
        if delivery.to_log() {
            self.write_log(log_level(style), msg)?;
        }
        Ok(())
    }

    /// Screen-only empty line.
    pub fn blank(&mut self) -> Result<()> {
        self.write_screen("", true)
    }

    /// Banner line, preceded by a blank screen line once output has started.
    pub fn banner(&mut self, title: &str) -> Result<()> {
        if self.printed {
            self.blank()?;
        }
        let banner = format_banner(title, self.width);
        self.display(&banner, Style::Banner, Delivery::Both)
    }

    /// Rewrite the current screen line. `finished` ends it with a newline.
    pub fn overprint(&mut self, msg: &str, style: Style, finished: bool) -> Result<()> {
        let painted = self.theme.paint(msg, style, self.use_color);
        let line = format!("\r{painted}");
        self.write_raw(&line, finished)?;
        self.overprinting = !finished;
        Ok(())
    }

    /// Write a pre-rendered multi-line block to the screen, separated from
    /// earlier output by a blank line.
    pub fn write_screen_block(&mut self, block: &str) -> Result<()> {
        if block.is_empty() {
            return Ok(());
        }
        if self.printed {
            self.blank()?;
        }
        for line in block.lines() {
            self.write_screen(line, true)?;
        }
        Ok(())
    }

    /// Write pre-rendered log lines.
    pub fn write_log_lines(&mut self, lines: &[LogLine]) -> Result<()> {
        for line in lines {
            self.write_log(line.level, &line.text)?;
        }
        Ok(())
    }

    /// Flush both sinks.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(screen) = self.screen.as_mut() {
            screen.flush().map_err(|e| Error::sink(SinkKind::Screen, e))?;
        }
        self.log.flush().map_err(|e| Error::sink(SinkKind::Log, e))
    }

    fn write_screen(&mut self, text: &str, newline: bool) -> Result<()> {
        if self.overprinting {
            self.overprinting = false;
            self.write_raw("", true)?;
        }
        self.write_raw(text, newline)
    }

    fn write_raw(&mut self, text: &str, newline: bool) -> Result<()> {
        let Some(screen) = self.screen.as_mut() else {
            return Ok(());
        };
        let result = if newline {
            writeln!(screen, "{text}")
        } else {
            write!(screen, "{text}").and_then(|_| screen.flush())
        };
        result.map_err(|e| Error::sink(SinkKind::Screen, e))?;
        self.printed = true;
        Ok(())
    }

    fn write_log(&mut self, level: Level, text: &str) -> Result<()> {
        self.log
            .log(level, text)
            .map_err(|e| Error::sink(SinkKind::Log, e))
    }
}
