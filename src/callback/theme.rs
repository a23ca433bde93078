//! Status presentation: the one lookup table shared by every renderer.
//!
//! Each [`StatusKind`] maps to a [`PresentationEntry`] (label, glyph and
//! color). The recap table, the inline recap and the per-host result lines
//! all read from the same [`Theme`], so a status never changes color or
//! symbol between two parts of the output.

use std::fmt;
use std::str::FromStr;

use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};

use crate::callback::types::StatusKind;
use crate::error::{Error, Result};

// ============================================================================
// Glyph Sets
// ============================================================================

/// Families of per-status symbols shown beside counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphSet {
    /// No glyphs
    #[default]
    None,
    /// Emoji faces
    Faces,
    /// Emoji hands
    Hands,
    /// Single capital letters
    Letters,
    /// Media player controls
    Media,
    /// Kaomoji
    Kaomoji,
    /// Signs and symbols
    Signs,
}

impl GlyphSet {
    /// Every glyph set, for listings.
    pub const ALL: [GlyphSet; 7] = [
        GlyphSet::None,
        GlyphSet::Faces,
        GlyphSet::Hands,
        GlyphSet::Letters,
        GlyphSet::Media,
        GlyphSet::Kaomoji,
        GlyphSet::Signs,
    ];

    /// Symbol for one status, empty for [`GlyphSet::None`].
    pub fn glyph(&self, kind: StatusKind) -> &'static str {
        use StatusKind::*;
        match self {
            GlyphSet::None => "",
            GlyphSet::Faces => match kind {
                Ok => "😊",
                Changed => "🤖",
                Unreachable => "💀",
                Failed => "😱",
                Skipped => "😶",
                Rescued => "⛑",
                Ignored => "🙈",
            },
            GlyphSet::Hands => match kind {
                Ok => "👌",
                Changed => "👍",
                Unreachable => "🤙",
                Failed => "👎",
                Skipped => "👋",
                Rescued => "🤝",
                Ignored => "💅",
            },
            GlyphSet::Letters => match kind {
                Ok => "O",
                Changed => "C",
                Unreachable => "U",
                Failed => "F",
                Skipped => "S",
                Rescued => "R",
                Ignored => "I",
            },
            GlyphSet::Media => match kind {
                Ok => "▶",
                Changed => "⏺",
                Unreachable => "⏏",
                Failed => "⏹",
                Skipped => "⏭",
                Rescued => "🔁",
                Ignored => "🔇",
            },
            GlyphSet::Kaomoji => match kind {
                Ok => "{^.^}",
                Changed => "(⊃｡•́‿•̀｡)⊃━✿✿✿",
                Unreachable => "┬┴┬┴┤(･_├┬┴┬┴",
                Failed => "(/▿＼ )",
                Skipped => "(∪｡∪)｡｡｡zzZ",
                Rescued => "┬──┬ノ(º_ºノ)",
                Ignored => "¯\\_(ツ)_/¯",
            },
            GlyphSet::Signs => match kind {
                Ok => "✅",
                Changed => "✨",
                Unreachable => "⛔",
                Failed => "❌",
                Skipped => "🍺",
                Rescued => "🆘",
                Ignored => "💤",
            },
        }
    }

    /// Configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            GlyphSet::None => "none",
            GlyphSet::Faces => "faces",
            GlyphSet::Hands => "hands",
            GlyphSet::Letters => "letters",
            GlyphSet::Media => "media",
            GlyphSet::Kaomoji => "kaomoji",
            GlyphSet::Signs => "signs",
        }
    }
}

impl fmt::Display for GlyphSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlyphSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        GlyphSet::ALL
            .iter()
            .copied()
            .find(|set| set.as_str() == wanted)
            .ok_or_else(|| Error::Config(format!("unknown glyph set '{s}'")))
    }
}

// ============================================================================
// Zero Counts
// ============================================================================

/// How a zero count is shown on screen.
///
/// The log rendering always shows a literal `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroDisplay {
    /// `0`, dimmed
    #[default]
    Dimmed,
    /// `-`, dimmed
    Placeholder,
    /// `0`, styled like any other count
    Literal,
}

impl ZeroDisplay {
    /// Screen text for a count and whether it should be dimmed.
    pub fn cell(&self, count: u64) -> (String, bool) {
        match (count, self) {
            (0, ZeroDisplay::Dimmed) => ("0".to_string(), true),
            (0, ZeroDisplay::Placeholder) => ("-".to_string(), true),
            (n, _) => (n.to_string(), false),
        }
    }
}

impl FromStr for ZeroDisplay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dimmed" | "dim" => Ok(ZeroDisplay::Dimmed),
            "placeholder" => Ok(ZeroDisplay::Placeholder),
            "literal" => Ok(ZeroDisplay::Literal),
            other => Err(Error::Config(format!("unknown zero display '{other}'"))),
        }
    }
}

// ============================================================================
// Semantic Styles
// ============================================================================

/// Semantic style tag attached to a line or cell.
///
/// Only the screen side turns it into escape codes; the log side uses it to
/// choose a log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// No styling
    Plain,
    /// Bold banner text
    Banner,
    /// Muted text
    Dim,
    /// Error text
    Error,
    /// Colored like a status
    Status(StatusKind),
}

// ============================================================================
// Presentation Table
// ============================================================================

/// Label, glyph and color for one status.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationEntry {
    /// Lowercase label (`ok`, `changed`, ...)
    pub label: &'static str,
    /// Symbol shown beside counts, possibly empty
    pub glyph: &'static str,
    /// Terminal color
    pub color: Color,
}

impl PresentationEntry {
    /// Column heading: capitalized label.
    pub fn title(&self) -> String {
        let mut chars = self.label.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Heading with the glyph in front, when there is one.
    pub fn heading(&self) -> String {
        if self.glyph.is_empty() {
            self.title()
        } else {
            format!("{} {}", self.glyph, self.title())
        }
    }
}

/// The status → presentation lookup shared by all renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    entries: [PresentationEntry; 7],
    glyphs: GlyphSet,
}

impl Theme {
    /// Default colors with the given glyph family.
    pub fn new(glyphs: GlyphSet) -> Self {
        let entries = StatusKind::ALL.map(|kind| PresentationEntry {
            label: kind.as_str(),
            glyph: glyphs.glyph(kind),
            color: default_color(kind),
        });
        Self { entries, glyphs }
    }

    /// Override the color of one status.
    pub fn with_color(mut self, kind: StatusKind, color: Color) -> Self {
        self.entries[kind.index()].color = color;
        self
    }

    /// Override a color by name, e.g. `"bright red"`.
    pub fn with_color_name(self, kind: StatusKind, name: &str) -> Result<Self> {
        let color = name
            .parse::<Color>()
            .map_err(|_| Error::Config(format!("unknown color '{name}' for status '{kind}'")))?;
        Ok(self.with_color(kind, color))
    }

    /// Presentation for one status.
    pub fn entry(&self, kind: StatusKind) -> &PresentationEntry {
        &self.entries[kind.index()]
    }

    /// Glyph family in use.
    pub fn glyphs(&self) -> GlyphSet {
        self.glyphs
    }

    /// Apply a semantic style to text. Returns the text unchanged when
    /// `use_color` is off.
    pub fn paint(&self, text: &str, style: Style, use_color: bool) -> String {
        if !use_color || text.is_empty() {
            return text.to_string();
        }
        match style {
            Style::Plain => text.to_string(),
            Style::Banner => text.bold().to_string(),
            Style::Dim => text.dimmed().to_string(),
            Style::Error => text.color(self.entry(StatusKind::Failed).color).to_string(),
            Style::Status(kind) => text.color(self.entry(kind).color).to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(GlyphSet::None)
    }
}

/// Ansible's stock color for each status.
fn default_color(kind: StatusKind) -> Color {
    match kind {
        StatusKind::Ok | StatusKind::Rescued => Color::Green,
        StatusKind::Changed => Color::Yellow,
        StatusKind::Unreachable => Color::BrightRed,
        StatusKind::Failed => Color::Red,
        StatusKind::Skipped => Color::Cyan,
        StatusKind::Ignored => Color::BrightMagenta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_glyph_set_covers_every_status() {
        for set in GlyphSet::ALL {
            for kind in StatusKind::ALL {
                let glyph = set.glyph(kind);
                assert_eq!(glyph.is_empty(), set == GlyphSet::None, "{set} / {kind}");
            }
        }
    }

    #[test]
    fn test_glyph_set_parse() {
        assert_eq!("Signs".parse::<GlyphSet>().unwrap(), GlyphSet::Signs);
        assert!("sparkles".parse::<GlyphSet>().is_err());
    }

    #[test]
    fn test_entry_heading() {
        let theme = Theme::new(GlyphSet::Letters);
        assert_eq!(theme.entry(StatusKind::Unreachable).title(), "Unreachable");
        assert_eq!(theme.entry(StatusKind::Ok).heading(), "O Ok");
        assert_eq!(Theme::default().entry(StatusKind::Ok).heading(), "Ok");
    }

    #[test]
    fn test_zero_display_cells() {
        assert_eq!(ZeroDisplay::Dimmed.cell(0), ("0".to_string(), true));
        assert_eq!(ZeroDisplay::Placeholder.cell(0), ("-".to_string(), true));
        assert_eq!(ZeroDisplay::Literal.cell(0), ("0".to_string(), false));
        assert_eq!(ZeroDisplay::Placeholder.cell(7), ("7".to_string(), false));
    }

    #[test]
    fn test_paint_without_color_is_identity() {
        let theme = Theme::default();
        for style in [
            Style::Plain,
            Style::Banner,
            Style::Dim,
            Style::Error,
            Style::Status(StatusKind::Changed),
        ] {
            assert_eq!(theme.paint("web1", style, false), "web1");
        }
    }

    #[test]
    fn test_color_override() {
        let theme = Theme::default()
            .with_color_name(StatusKind::Skipped, "blue")
            .unwrap();
        assert_eq!(theme.entry(StatusKind::Skipped).color, Color::Blue);
        assert_eq!(theme.entry(StatusKind::Ok).color, Color::Green);
    }
}
