//! Output plugins for playbook runs.
//!
//! # Available Plugins
//!
//! - [`RichCallback`] - Banners, result lines, retry progress and the recap
//! - [`RecapRenderer`] - The `PLAY RECAP` table or inline lines, plus custom
//!   statistics and the dry-run marker
//! - [`ProgressTracker`] - Transient per-host progress bars for retry loops
//!
//! # Example
//!
//! ```rust,ignore
//! use playrecap::callback::plugins::{render_recap, RecapRenderer};
//!
//! // Default presentation
//! let output = render_recap(&stats, true, false);
//! print!("{}", output.screen);
//!
//! // Inline layout with glyphs
//! let renderer = RecapRenderer::new(
//!     Theme::new(GlyphSet::Signs),
//!     RecapOptions { layout: RecapLayout::Inline, ..Default::default() },
//! );
//! let output = renderer.render(&stats, false);
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod progress;
pub mod recap;
pub mod rich;

// ============================================================================
// Exports
// ============================================================================

pub use progress::{
    DrawTarget, ProgressConfig, ProgressHandle, ProgressSnapshot, ProgressTracker, RefreshPolicy,
};
pub use recap::{render_recap, RecapLayout, RecapOptions, RecapOutput, RecapRenderer, RecapTotals};
pub use rich::RichCallback;
