//! Recap Configuration
//!
//! Layered configuration for the recap renderer, the progress bars and the
//! console display, with this precedence:
//!
//! 1. Default values (lowest priority)
//! 2. Configuration file (TOML, YAML, or JSON)
//! 3. Environment variables
//! 4. CLI arguments (highest priority)
//!
//! # Configuration File Format (TOML)
//!
//! ```toml
//! [recap]
//! # "table" or "inline"
//! layout = "table"
//!
//! # none, faces, hands, letters, media, kaomoji, signs
//! glyphs = "signs"
//!
//! # "dimmed", "placeholder" or "literal"
//! zero_display = "dimmed"
//!
//! # "reject" or "zero"
//! missing_counts = "reject"
//!
//! show_custom_stats = true
//! check_mode_markers = true
//! use_colors = true
//! width = 100
//!
//! # Retry-loop progress bars
//! progress = true
//! draw_target = "stderr"
//! refresh = { mode = "steady", interval_ms = 100 }
//!
//! [recap.colors]
//! skipped = "blue"
//! ```
//!
//! # Environment Variables
//!
//! - `PLAYRECAP_LAYOUT` - Recap layout
//! - `PLAYRECAP_GLYPHS` - Glyph set
//! - `PLAYRECAP_ZERO_DISPLAY` - Zero count display
//! - `PLAYRECAP_MISSING_COUNTS` - Missing counter policy
//! - `PLAYRECAP_SHOW_CUSTOM_STATS` - Show custom statistics (true/false)
//! - `PLAYRECAP_CHECK_MODE_MARKERS` - Mark dry runs (true/false)
//! - `PLAYRECAP_PROGRESS` - Retry-loop progress bars (true/false)
//! - `PLAYRECAP_DRAW_TARGET` - Where progress bars are drawn
//! - `PLAYRECAP_WIDTH` - Banner width
//! - `PLAYRECAP_NO_COLOR` / `NO_COLOR` - Disable colors
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use playrecap::callback::config::RecapConfigLoader;
//!
//! let config = RecapConfigLoader::new()
//!     .with_file("playrecap.toml")
//!     .with_layout(RecapLayout::Inline)
//!     .load()?;
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::callback::plugins::progress::{DrawTarget, ProgressConfig, RefreshPolicy};
use crate::callback::plugins::recap::{RecapLayout, RecapOptions};
use crate::callback::theme::{GlyphSet, Theme, ZeroDisplay};
use crate::callback::types::{MissingCountPolicy, StatusKind};
use crate::error::Result;
use crate::output::OUTPUT_WIDTH;

/// Default environment variable prefix.
pub const ENV_PREFIX: &str = "PLAYRECAP";

// ============================================================================
// Core Configuration Types
// ============================================================================

/// Settings for the recap, the progress bars and the display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecapConfig {
    /// Screen layout of the recap
    pub layout: RecapLayout,

    /// Glyphs shown beside counts
    pub glyphs: GlyphSet,

    /// How zero counts look on screen
    pub zero_display: ZeroDisplay,

    /// How incomplete counter sets are treated
    pub missing_counts: MissingCountPolicy,

    /// Whether to render custom statistics
    pub show_custom_stats: bool,

    /// Whether dry runs get a `DRY RUN` marker
    pub check_mode_markers: bool,

    /// Whether to use colored output
    pub use_colors: bool,

    /// Whether retry loops get progress bars
    pub progress: bool,

    /// Progress bar redraw policy
    pub refresh: RefreshPolicy,

    /// Where progress bars are drawn
    pub draw_target: DrawTarget,

    /// Banner width
    pub width: usize,

    /// Per-status color overrides, e.g. `skipped = "blue"`
    pub colors: BTreeMap<String, String>,
}

impl Default for RecapConfig {
    fn default() -> Self {
        Self {
            layout: RecapLayout::Table,
            glyphs: GlyphSet::None,
            zero_display: ZeroDisplay::Dimmed,
            missing_counts: MissingCountPolicy::Reject,
            show_custom_stats: false,
            check_mode_markers: true,
            use_colors: true,
            progress: true,
            refresh: RefreshPolicy::default(),
            draw_target: DrawTarget::Stderr,
            width: OUTPUT_WIDTH,
            colors: BTreeMap::new(),
        }
    }
}

impl RecapConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Theme with the configured glyphs and color overrides.
    pub fn theme(&self) -> Result<Theme> {
        let mut theme = Theme::new(self.glyphs);
        for (status, color) in &self.colors {
            let kind: StatusKind = status.parse()?;
            theme = theme.with_color_name(kind, color)?;
        }
        Ok(theme)
    }

    /// Options for the recap renderer.
    pub fn recap_options(&self) -> RecapOptions {
        RecapOptions {
            layout: self.layout,
            zero_display: self.zero_display,
            show_custom: self.show_custom_stats,
            check_mode_markers: self.check_mode_markers,
            use_color: self.use_colors,
            width: self.width,
            missing_counts: self.missing_counts,
        }
    }

    /// Options for the progress tracker.
    pub fn progress_config(&self) -> ProgressConfig {
        ProgressConfig {
            refresh: self.refresh,
            draw_target: self.draw_target,
            ..ProgressConfig::default()
        }
    }

    /// Apply the fields a layer sets; unset fields keep their current value.
    pub fn apply(&mut self, layer: RecapConfigLayer) {
        if let Some(layout) = layer.layout {
            self.layout = layout;
        }
        if let Some(glyphs) = layer.glyphs {
            self.glyphs = glyphs;
        }
        if let Some(zero_display) = layer.zero_display {
            self.zero_display = zero_display;
        }
        if let Some(missing_counts) = layer.missing_counts {
            self.missing_counts = missing_counts;
        }
        if let Some(show) = layer.show_custom_stats {
            self.show_custom_stats = show;
        }
        if let Some(markers) = layer.check_mode_markers {
            self.check_mode_markers = markers;
        }
        if let Some(use_colors) = layer.use_colors {
            self.use_colors = use_colors;
        }
        if let Some(progress) = layer.progress {
            self.progress = progress;
        }
        if let Some(refresh) = layer.refresh {
            self.refresh = refresh;
        }
        if let Some(draw_target) = layer.draw_target {
            self.draw_target = draw_target;
        }
        if let Some(width) = layer.width {
            self.width = width;
        }

        self.colors.extend(layer.colors);
    }
}

/// One configuration source: a file, the environment or the command line.
///
/// Only the fields a source actually sets are `Some`, so a later layer can
/// put a value back to its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecapConfigLayer {
    pub layout: Option<RecapLayout>,
    pub glyphs: Option<GlyphSet>,
    pub zero_display: Option<ZeroDisplay>,
    pub missing_counts: Option<MissingCountPolicy>,
    pub show_custom_stats: Option<bool>,
    pub check_mode_markers: Option<bool>,
    pub use_colors: Option<bool>,
    pub progress: Option<bool>,
    pub refresh: Option<RefreshPolicy>,
    pub draw_target: Option<DrawTarget>,
    pub width: Option<usize>,
    pub colors: BTreeMap<String, String>,
}

// ============================================================================
// Configuration Loader
// ============================================================================

/// Loads [`RecapConfig`] from all sources in precedence order:
///
/// 1. Default values
/// 2. Configuration files
/// 3. Environment variables
/// 4. CLI arguments
#[derive(Debug)]
pub struct RecapConfigLoader {
    /// Configuration files to load (in order)
    config_files: Vec<PathBuf>,
    /// Environment variable prefix
    env_prefix: Option<String>,
    /// CLI overrides
    cli_overrides: RecapConfigLayer,
    /// Whether to load from standard locations
    load_standard_locations: bool,
}

impl Default for RecapConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl RecapConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self {
            config_files: Vec::new(),
            env_prefix: Some(ENV_PREFIX.to_string()),
            cli_overrides: RecapConfigLayer::default(),
            load_standard_locations: true,
        }
    }

    /// Add a configuration file to load.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Disable environment variable loading.
    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Disable loading from standard configuration locations.
    pub fn without_standard_locations(mut self) -> Self {
        self.load_standard_locations = false;
        self
    }

    /// Set CLI override for the layout.
    pub fn with_layout(mut self, layout: RecapLayout) -> Self {
        self.cli_overrides.layout = Some(layout);
        self
    }

    /// Set CLI override for the glyph set.
    pub fn with_glyphs(mut self, glyphs: GlyphSet) -> Self {
        self.cli_overrides.glyphs = Some(glyphs);
        self
    }

    /// Set CLI override for custom statistics.
    pub fn with_show_custom_stats(mut self, show: bool) -> Self {
        self.cli_overrides.show_custom_stats = Some(show);
        self
    }

    /// Set CLI override for progress bars.
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.cli_overrides.progress = Some(enabled);
        self
    }

    /// Set CLI override for colors.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.cli_overrides.use_colors = Some(use_colors);
        self
    }

    /// Load configuration from all sources.
    pub fn load(self) -> anyhow::Result<RecapConfig> {
        let mut config = RecapConfig::default();

        // Load from standard locations if enabled
        if self.load_standard_locations {
            for path in Self::standard_config_paths() {
                if path.exists() {
                    debug!("Loading recap config from: {}", path.display());
                    match Self::load_file(&path) {
                        Ok(layer) => config.apply(layer),
                        Err(e) => warn!("Ignoring recap config {}: {:#}", path.display(), e),
                    }
                }
            }
        }

        // Load from explicitly specified files
        for path in &self.config_files {
            debug!("Loading recap config from: {}", path.display());
            let layer = Self::load_file(path)
                .with_context(|| format!("Failed to load config from: {}", path.display()))?;
            config.apply(layer);
        }

        // Apply environment variables
        if let Some(prefix) = &self.env_prefix {
            config.apply(Self::load_from_env(prefix));
        }

        // Apply CLI overrides (highest priority)
        config.apply(self.cli_overrides);

        Ok(config)
    }

    /// Get standard configuration file locations.
    fn standard_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/playrecap/config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("playrecap/config.toml"));
            paths.push(config_dir.join("playrecap/config.yml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".playrecap.toml"));
        }

        // Project-local config
        paths.push(PathBuf::from("playrecap.toml"));

        paths
    }

    /// Load configuration from a file.
    fn load_file(path: &Path) -> anyhow::Result<RecapConfigLayer> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        // Parse based on file extension
        let wrapper: ConfigFile = match extension {
            "toml" => toml::from_str(&content)?,
            "yml" | "yaml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => toml::from_str(&content)
                .or_else(|_| serde_yaml::from_str(&content))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(wrapper.recap)
    }

    /// Load the layer set by environment variables.
    fn load_from_env(prefix: &str) -> RecapConfigLayer {
        let mut layer = RecapConfigLayer {
            layout: parse_env(prefix, "LAYOUT"),
            glyphs: parse_env(prefix, "GLYPHS"),
            zero_display: parse_env(prefix, "ZERO_DISPLAY"),
            missing_counts: parse_env(prefix, "MISSING_COUNTS"),
            show_custom_stats: flag_env(prefix, "SHOW_CUSTOM_STATS"),
            check_mode_markers: flag_env(prefix, "CHECK_MODE_MARKERS"),
            progress: flag_env(prefix, "PROGRESS"),
            draw_target: parse_env(prefix, "DRAW_TARGET"),
            width: parse_env(prefix, "WIDTH"),
            ..RecapConfigLayer::default()
        };

        // Colors
        if let Some(no_color) = flag_env(prefix, "NO_COLOR") {
            layer.use_colors = Some(!no_color);
        }
        // Also check standard NO_COLOR
        if env::var("NO_COLOR").is_ok() {
            layer.use_colors = Some(false);
        }

        layer
    }
}

/// Parse `<prefix>_<name>` with `FromStr`, warning on invalid values.
fn parse_env<T>(prefix: &str, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let key = format!("{}_{}", prefix, name);
    let val = env::var(&key).ok()?;
    match val.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Ignoring {}: {}", key, e);
            None
        }
    }
}

/// Read `<prefix>_<name>` as a boolean flag, warning on unrecognized values.
fn flag_env(prefix: &str, name: &str) -> Option<bool> {
    let key = format!("{}_{}", prefix, name);
    let val = env::var(&key).ok()?;
    let flag = parse_flag(&val);
    if flag.is_none() {
        warn!("Ignoring {}: not a boolean: {}", key, val);
    }
    flag
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Wrapper for config file format that nests under [recap].
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    recap: RecapConfigLayer,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use colored::Color;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = RecapConfig::default();
        assert_eq!(config.layout, RecapLayout::Table);
        assert_eq!(config.glyphs, GlyphSet::None);
        assert!(!config.show_custom_stats);
        assert!(config.check_mode_markers);
        assert!(config.use_colors);
        assert!(config.progress);
        assert_eq!(config.width, 80);
    }

    #[test]
    fn test_layer_apply() {
        let mut config = RecapConfig::default();
        config.apply(RecapConfigLayer {
            layout: Some(RecapLayout::Inline),
            show_custom_stats: Some(true),
            progress: Some(false),
            ..Default::default()
        });

        assert_eq!(config.layout, RecapLayout::Inline);
        assert!(config.show_custom_stats);
        assert!(!config.progress);
        assert!(config.use_colors);

        // A later layer may restore defaults.
        config.apply(RecapConfigLayer {
            layout: Some(RecapLayout::Table),
            show_custom_stats: Some(false),
            progress: Some(true),
            ..Default::default()
        });
        assert_eq!(config, RecapConfig::default());
    }

    #[test]
    fn test_load_toml_config() {
        let toml_content = r#"
[recap]
layout = "inline"
glyphs = "letters"
zero_display = "placeholder"
missing_counts = "zero"
show_custom_stats = true
width = 100
draw_target = "hidden"
refresh = { mode = "immediate" }

[recap.colors]
skipped = "blue"
"#;

        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = RecapConfigLoader::new()
            .without_standard_locations()
            .without_env()
            .with_file(file.path())
            .load()
            .unwrap();

        assert_eq!(config.layout, RecapLayout::Inline);
        assert_eq!(config.glyphs, GlyphSet::Letters);
        assert_eq!(config.zero_display, ZeroDisplay::Placeholder);
        assert_eq!(config.missing_counts, MissingCountPolicy::Zero);
        assert!(config.show_custom_stats);
        assert_eq!(config.width, 100);
        assert_eq!(config.draw_target, DrawTarget::Hidden);
        assert_eq!(config.refresh, RefreshPolicy::Immediate);

        let theme = config.theme().unwrap();
        assert_eq!(theme.entry(StatusKind::Skipped).color, Color::Blue);
        assert_eq!(theme.entry(StatusKind::Ok).glyph, "O");
    }

    #[test]
    fn test_load_yaml_config() {
        let yaml_content = r#"
recap:
  layout: inline
  check_mode_markers: false
  refresh:
    mode: steady
    interval_ms: 250
"#;

        let mut file = NamedTempFile::with_suffix(".yml").unwrap();
        file.write_all(yaml_content.as_bytes()).unwrap();

        let config = RecapConfigLoader::new()
            .without_standard_locations()
            .without_env()
            .with_file(file.path())
            .load()
            .unwrap();

        assert_eq!(config.layout, RecapLayout::Inline);
        assert!(!config.check_mode_markers);
        assert_eq!(config.refresh, RefreshPolicy::Steady { interval_ms: 250 });
    }

    #[test]
    fn test_load_json_config() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(br#"{"recap": {"glyphs": "signs", "use_colors": false}}"#)
            .unwrap();

        let config = RecapConfigLoader::new()
            .without_standard_locations()
            .without_env()
            .with_file(file.path())
            .load()
            .unwrap();

        assert_eq!(config.glyphs, GlyphSet::Signs);
        assert!(!config.use_colors);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = RecapConfigLoader::new()
            .without_standard_locations()
            .without_env()
            .with_file("/nonexistent/playrecap.toml")
            .load();
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_color_override() {
        let mut config = RecapConfig::default();
        config
            .colors
            .insert("failed".to_string(), "ultraviolet".to_string());
        assert!(config.theme().is_err());

        let mut config = RecapConfig::default();
        config.colors.insert("broken".to_string(), "red".to_string());
        assert!(config.theme().is_err());
    }

    #[test]
    fn test_recap_options_follow_config() {
        let config = RecapConfig {
            layout: RecapLayout::Inline,
            show_custom_stats: true,
            use_colors: false,
            width: 60,
            ..Default::default()
        };
        let options = config.recap_options();
        assert_eq!(options.layout, RecapLayout::Inline);
        assert!(options.show_custom);
        assert!(!options.use_color);
        assert_eq!(options.width, 60);
    }

    #[test]
    #[serial]
    fn test_env_loading() {
        env::set_var("TEST_RECAP_LAYOUT", "inline");
        env::set_var("TEST_RECAP_GLYPHS", "hands");
        env::set_var("TEST_RECAP_SHOW_CUSTOM_STATS", "true");
        env::set_var("TEST_RECAP_PROGRESS", "0");
        env::set_var("TEST_RECAP_WIDTH", "120");

        let layer = RecapConfigLoader::load_from_env("TEST_RECAP");

        assert_eq!(layer.layout, Some(RecapLayout::Inline));
        assert_eq!(layer.glyphs, Some(GlyphSet::Hands));
        assert_eq!(layer.show_custom_stats, Some(true));
        assert_eq!(layer.progress, Some(false));
        assert_eq!(layer.width, Some(120));
        assert_eq!(layer.zero_display, None);

        // Clean up
        env::remove_var("TEST_RECAP_LAYOUT");
        env::remove_var("TEST_RECAP_GLYPHS");
        env::remove_var("TEST_RECAP_SHOW_CUSTOM_STATS");
        env::remove_var("TEST_RECAP_PROGRESS");
        env::remove_var("TEST_RECAP_WIDTH");
    }

    #[test]
    #[serial]
    fn test_invalid_env_value_is_ignored() {
        env::set_var("TEST_BAD_LAYOUT", "spiral");
        env::set_var("TEST_BAD_PROGRESS", "maybe");
        env::set_var("TEST_BAD_SHOW_CUSTOM_STATS", "yes");
        let layer = RecapConfigLoader::load_from_env("TEST_BAD");
        assert_eq!(layer.layout, None);
        assert_eq!(layer.progress, None);
        assert_eq!(layer.show_custom_stats, Some(true));
        env::remove_var("TEST_BAD_LAYOUT");
        env::remove_var("TEST_BAD_PROGRESS");
        env::remove_var("TEST_BAD_SHOW_CUSTOM_STATS");
    }

    #[test]
    #[serial]
    fn test_precedence_file_env_cli() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(b"[recap]\nglyphs = \"faces\"\nwidth = 90\n")
            .unwrap();

        env::set_var("TEST_PREC_GLYPHS", "media");

        let config = RecapConfigLoader::new()
            .without_standard_locations()
            .with_env_prefix("TEST_PREC")
            .with_file(file.path())
            .with_glyphs(GlyphSet::Kaomoji)
            .load()
            .unwrap();

        env::remove_var("TEST_PREC_GLYPHS");

        assert_eq!(config.glyphs, GlyphSet::Kaomoji);
        assert_eq!(config.width, 90);
    }

    #[test]
    #[serial]
    fn test_env_restores_default_over_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(b"[recap]\nshow_custom_stats = true\nlayout = \"inline\"\nprogress = false\n")
            .unwrap();

        env::set_var("TEST_RESET_SHOW_CUSTOM_STATS", "false");
        env::set_var("TEST_RESET_LAYOUT", "table");

        let config = RecapConfigLoader::new()
            .without_standard_locations()
            .with_env_prefix("TEST_RESET")
            .with_file(file.path())
            .with_progress(true)
            .load()
            .unwrap();

        env::remove_var("TEST_RESET_SHOW_CUSTOM_STATS");
        env::remove_var("TEST_RESET_LAYOUT");

        assert!(!config.show_custom_stats);
        assert_eq!(config.layout, RecapLayout::Table);
        assert!(config.progress);
    }

    #[test]
    fn test_parse_flag() {
        for val in ["true", "1", "YES", " on "] {
            assert_eq!(parse_flag(val), Some(true), "{val}");
        }
        for val in ["false", "0", "no", "Off"] {
            assert_eq!(parse_flag(val), Some(false), "{val}");
        }
        assert_eq!(parse_flag("maybe"), None);
    }
}
