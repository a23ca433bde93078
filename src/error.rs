//! Error types for Playrecap.
//!
//! Every error here is either a contract violation by the integration layer
//! (malformed stats, progress lifecycle out of order) or an output sink that
//! refused a write. None of them are retried internally.

use std::fmt;
use std::io;

use thiserror::Error;

/// Result type alias for Playrecap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Identifies which output sink rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// The interactive screen (terminal or any `io::Write`)
    Screen,
    /// The durable log
    Log,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Screen => f.write_str("screen"),
            SinkKind::Log => f.write_str("log"),
        }
    }
}

/// The main error type for Playrecap.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Recap Errors
    // ========================================================================
    /// Per-host counters are missing a status or carry an unknown one.
    #[error("Malformed stats for host '{host}': {reason}")]
    MalformedStats {
        /// Host whose counter set is broken
        host: String,
        /// What is wrong with it
        reason: String,
    },

    // ========================================================================
    // Progress Lifecycle Errors
    // ========================================================================
    /// A progress handle already exists for this (host, task) pair.
    #[error("Progress handle already registered for host '{host}' on task '{task}'")]
    DuplicateHandle {
        /// Host identifier
        host: String,
        /// Task identifier
        task: String,
    },

    /// No progress handle is registered for this (host, task) pair.
    #[error("No progress handle registered for host '{host}' on task '{task}'")]
    UnknownHandle {
        /// Host identifier
        host: String,
        /// Task identifier
        task: String,
    },

    // ========================================================================
    // Output Errors
    // ========================================================================
    /// The screen or log sink rejected a write.
    #[error("Failed to write to {sink} sink: {source}")]
    SinkWriteFailure {
        /// Which sink failed
        sink: SinkKind,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a malformed stats error.
    pub fn malformed(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedStats {
            host: host.into(),
            reason: reason.into(),
        }
    }

    /// Create a duplicate handle error.
    pub fn duplicate_handle(host: impl Into<String>, task: impl Into<String>) -> Self {
        Error::DuplicateHandle {
            host: host.into(),
            task: task.into(),
        }
    }

    /// Create an unknown handle error.
    pub fn unknown_handle(host: impl Into<String>, task: impl Into<String>) -> Self {
        Error::UnknownHandle {
            host: host.into(),
            task: task.into(),
        }
    }

    /// Wrap an I/O error raised by the given sink.
    pub fn sink(sink: SinkKind, source: io::Error) -> Self {
        Error::SinkWriteFailure { sink, source }
    }

    /// Returns true for errors caused by the caller breaking the
    /// progress lifecycle protocol.
    pub fn is_lifecycle_violation(&self) -> bool {
        matches!(
            self,
            Error::DuplicateHandle { .. } | Error::UnknownHandle { .. }
        )
    }
}
