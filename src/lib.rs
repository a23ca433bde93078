//! # Playrecap - Console and Log Output for Playbook Runs
//!
//! Playrecap turns the lifecycle events of an automation playbook run into
//! human-facing output: colored banners and per-host result lines,
//! transient progress bars for tasks in a retry loop, and the final
//! `PLAY RECAP` with per-host counters, column totals, custom statistics
//! and a dry-run marker.
//!
//! The playbook engine itself is not part of this crate; it reports events
//! and final counters, and playrecap renders them.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 LifecycleEvent (from the engine)             │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                RichCallback::dispatch (one match)            │
//! └──────────────────────────────────────────────────────────────┘
//!          │                    │                      │
//!          ▼                    ▼                      ▼
//! ┌─────────────────┐  ┌──────────────────┐  ┌──────────────────┐
//! │ ProgressTracker │  │  RecapRenderer   │  │     Display      │
//! │  (indicatif)    │  │ (table / inline) │  │ (screen + log)   │
//! └─────────────────┘  └──────────────────┘  └──────────────────┘
//!                               │                      │
//!                               └──────── Theme ───────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust
//! use playrecap::prelude::*;
//!
//! let stats = RunStats::new()
//!     .with_host("web1", HostStats::new().with(StatusKind::Ok, 5).with(StatusKind::Changed, 2))
//!     .with_host("web2", HostStats::new().with(StatusKind::Failed, 1));
//!
//! let output = render_recap(&stats, false, false);
//! assert!(output.log_text().contains("Total"));
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types.
    //!
    //! See [`callback::prelude`] for the full callback surface.
    //!
    //! [`callback::prelude`]: crate::callback::prelude

    pub use crate::callback::prelude::*;
    pub use crate::error::{Error, Result};
}

pub mod callback;
pub mod error;
pub mod output;

pub use error::{Error, Result};
