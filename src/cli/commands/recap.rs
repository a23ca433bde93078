//! Recap command - render a finished run
//!
//! Loads a run statistics document (JSON or YAML) and prints the recap.

use super::{CommandContext, Runnable};
use anyhow::{Context, Result};
use clap::Parser;
use playrecap::callback::{GlyphSet, RecapLayout, RecapRenderer, RunStatsDocument};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Arguments for the recap command
#[derive(Parser, Debug, Clone)]
pub struct RecapArgs {
    /// Path to the stats file (.json, .yml or .yaml)
    #[arg(required = true)]
    pub file: PathBuf,

    /// Mark the run as a dry run
    #[arg(long)]
    pub dry_run: bool,

    /// Show custom statistics
    #[arg(long)]
    pub show_custom: bool,

    /// Recap layout (table or inline)
    #[arg(long)]
    pub layout: Option<RecapLayout>,

    /// Glyph set shown beside counts
    #[arg(long)]
    pub glyphs: Option<GlyphSet>,

    /// Write the plain log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl RecapArgs {
    /// Execute the recap command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let mut loader = ctx.loader();
        if self.show_custom {
            loader = loader.with_show_custom_stats(true);
        }
        if let Some(layout) = self.layout {
            loader = loader.with_layout(layout);
        }
        if let Some(glyphs) = self.glyphs {
            loader = loader.with_glyphs(glyphs);
        }
        let config = loader.load()?;

        let doc = load_document(&self.file)?;
        debug!("Loaded stats for {} hosts", doc.hosts.len());

        let theme = config.theme()?;
        let renderer = RecapRenderer::new(theme.clone(), config.recap_options());
        let output = renderer
            .render_document(doc, self.dry_run)
            .with_context(|| format!("Invalid stats in {}", self.file.display()))?;

        let mut display = ctx
            .display(self.log_file.as_deref())?
            .with_theme(theme)
            .with_color(config.use_colors)
            .with_width(config.width);
        output.emit(&mut display)?;

        Ok(0)
    }
}

impl Runnable for RecapArgs {
    fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx)
    }
}

/// Parse a stats document, choosing YAML or JSON by extension.
fn load_document(path: &Path) -> Result<RunStatsDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read stats file: {}", path.display()))?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let doc = match extension {
        "yml" | "yaml" => RunStatsDocument::from_yaml(&content)
            .with_context(|| format!("Failed to parse YAML stats: {}", path.display()))?,
        _ => RunStatsDocument::from_json(&content)
            .with_context(|| format!("Failed to parse JSON stats: {}", path.display()))?,
    };
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_yaml_document() {
        let mut file = NamedTempFile::with_suffix(".yml").unwrap();
        file.write_all(b"hosts:\n  web1:\n    ok: 2\n").unwrap();
        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc.hosts["web1"]["ok"], 2);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(b"{not json").unwrap();
        assert!(load_document(file.path()).is_err());
    }
}
