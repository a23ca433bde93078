//! Console and Log Output for Playbook Runs
//!
//! This module receives the lifecycle events of a playbook run and turns
//! them into human-facing output: colored banners and result lines on the
//! screen, plain lines in the log, transient progress bars for retry loops
//! and the final recap.
//!
//! # Architecture
//!
//! 1. **[`types`]**: status kinds, per-host counters, run statistics and the
//!    [`LifecycleEvent`] enum
//! 2. **[`theme`]**: the status → (label, glyph, color) lookup shared by
//!    every renderer
//! 3. **[`display`]**: the screen sink and the log sink behind one façade
//! 4. **[`plugins`]**: the recap renderer, the progress tracker and the
//!    [`RichCallback`] that drives both
//! 5. **[`config`]**: layered configuration
//!
//! # Quick Start with Prelude
//!
//! ```rust,ignore
//! use playrecap::callback::prelude::*;
//!
//! let config = RecapConfigLoader::new().load()?;
//! let mut callback = RichCallback::from_config(&config, Display::stdout())?;
//!
//! callback.dispatch(&LifecycleEvent::PlayStart { name: "webservers".into() })?;
//! ```

pub mod config;
pub mod display;
pub mod plugins;
pub mod theme;
pub mod types;

// ============================================================================
// Re-exports (Flat access for convenience)
// ============================================================================

pub use config::{RecapConfig, RecapConfigLayer, RecapConfigLoader};
pub use display::{Delivery, Display, LogLine, LogSink, NullLog, TracingLog, WriterLog};
pub use plugins::{
    render_recap, DrawTarget, ProgressConfig, ProgressHandle, ProgressSnapshot, ProgressTracker,
    RecapLayout, RecapOptions, RecapOutput, RecapRenderer, RecapTotals, RefreshPolicy,
    RichCallback,
};
pub use theme::{GlyphSet, PresentationEntry, Style, Theme, ZeroDisplay};
pub use types::{
    HostStats, LifecycleEvent, MissingCountPolicy, RunStats, RunStatsDocument, StatusKind,
};

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for rendering run output.
///
/// # Example
///
/// ```rust,ignore
/// use playrecap::callback::prelude::*;
///
/// let stats = RunStats::new().with_host("web1", HostStats::new().with(StatusKind::Ok, 3));
/// let output = render_recap(&stats, false, false);
/// ```
pub mod prelude {
    // ========================================================================
    // Data Model
    // ========================================================================

    pub use super::HostStats;
    pub use super::LifecycleEvent;
    pub use super::MissingCountPolicy;
    pub use super::RunStats;
    pub use super::RunStatsDocument;
    pub use super::StatusKind;

    // ========================================================================
    // Presentation
    // ========================================================================

    pub use super::Delivery;
    pub use super::Display;
    pub use super::GlyphSet;
    pub use super::LogSink;
    pub use super::Style;
    pub use super::Theme;
    pub use super::ZeroDisplay;

    // ========================================================================
    // Plugins
    // ========================================================================

    pub use super::render_recap;
    pub use super::ProgressConfig;
    pub use super::ProgressTracker;
    pub use super::RecapLayout;
    pub use super::RecapOptions;
    pub use super::RecapOutput;
    pub use super::RecapRenderer;
    pub use super::RichCallback;

    // ========================================================================
    // Configuration
    // ========================================================================

    pub use super::RecapConfig;
    pub use super::RecapConfigLayer;
    pub use super::RecapConfigLoader;
}
