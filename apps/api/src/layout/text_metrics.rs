//! Text-height estimation for print sections.
//!
//! Character width is a single multiplier of the font size per script class.
//! This is an intentional approximation: the browser's real layout pass uses
//! exact glyph metrics, but a per-script average is stable enough that packing
//! decisions rarely move by more than one line. The safety margin carried by
//! `PageCapacity` absorbs the residual error.
//!
//! Everything here is pure and allocation-free so it can run headlessly in
//! tests, inside `spawn_blocking`, or in a batch export.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Constants
// ────────────────────────────────────────────────────────────────────────────

/// Average Latin glyph width in em units.
pub const NARROW_CHAR_WIDTH_EM: f64 = 0.55;

/// Full-width glyph width in em units (Hangul, CJK ideographs, kana).
pub const WIDE_CHAR_WIDTH_EM: f64 = 1.0;

/// First codepoint treated as wide when the script hint is `Auto` (Hangul Jamo).
pub const WIDE_SCRIPT_THRESHOLD: char = '\u{1100}';

const MIN_FONT_SIZE_PX: f64 = 1.0;
const DEFAULT_LINE_HEIGHT: f64 = 1.0;

// ────────────────────────────────────────────────────────────────────────────
// Style
// ────────────────────────────────────────────────────────────────────────────

/// Which character-width multiplier to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptHint {
    /// Inspect the text: any char at or above `WIDE_SCRIPT_THRESHOLD` makes it wide.
    #[default]
    Auto,
    Latin,
    Wide,
}

/// Typography that affects a section's height estimate. It has no effect on
/// packing semantics beyond the height it produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionStyle {
    pub font_size_px: f64,
    pub line_height_multiplier: f64,
    pub horizontal_padding_px: f64,
    pub vertical_padding_px: f64,
    pub script: ScriptHint,
}

impl Default for SectionStyle {
    fn default() -> Self {
        Self {
            font_size_px: 16.0,
            line_height_multiplier: 1.7,
            horizontal_padding_px: 0.0,
            vertical_padding_px: 0.0,
            script: ScriptHint::Auto,
        }
    }
}

impl SectionStyle {
    pub fn new(font_size_px: f64, line_height_multiplier: f64) -> Self {
        Self {
            font_size_px,
            line_height_multiplier,
            ..Self::default()
        }
    }

    pub fn with_padding(mut self, horizontal_px: f64, vertical_px: f64) -> Self {
        self.horizontal_padding_px = horizontal_px;
        self.vertical_padding_px = vertical_px;
        self
    }

    pub fn with_script(mut self, script: ScriptHint) -> Self {
        self.script = script;
        self
    }

    fn font_size(&self) -> f64 {
        positive_or(self.font_size_px, MIN_FONT_SIZE_PX)
    }

    fn line_height(&self) -> f64 {
        positive_or(self.line_height_multiplier, DEFAULT_LINE_HEIGHT)
    }

    fn horizontal_padding(&self) -> f64 {
        positive_or(self.horizontal_padding_px, 0.0)
    }

    fn vertical_padding(&self) -> f64 {
        positive_or(self.vertical_padding_px, 0.0)
    }

    /// Height of a single rendered line, padding excluded.
    pub fn line_height_px(&self) -> f64 {
        self.font_size() * self.line_height()
    }
}

/// Line count and height for one block of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineEstimate {
    pub lines: u32,
    pub height_px: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Estimation
// ────────────────────────────────────────────────────────────────────────────

/// Returns true when the text contains at least one wide-script character.
pub fn is_wide_text(text: &str) -> bool {
    text.chars().any(|c| c >= WIDE_SCRIPT_THRESHOLD)
}

/// Effective width of one character in px for this text and style.
pub fn char_width_px(text: &str, style: &SectionStyle) -> f64 {
    let em = match style.script {
        ScriptHint::Latin => NARROW_CHAR_WIDTH_EM,
        ScriptHint::Wide => WIDE_CHAR_WIDTH_EM,
        ScriptHint::Auto if is_wide_text(text) => WIDE_CHAR_WIDTH_EM,
        ScriptHint::Auto => NARROW_CHAR_WIDTH_EM,
    };
    style.font_size() * em
}

/// How many characters fit on one line. `None` when the usable width is not
/// a positive finite number, in which case callers fall back to one line.
fn chars_per_line(text: &str, style: &SectionStyle, container_width_px: f64) -> Option<u64> {
    let usable = container_width_px - style.horizontal_padding();
    if !(usable > 0.0) || !usable.is_finite() {
        return None;
    }
    let per_line = (usable / char_width_px(text, style)).floor();
    // Float → int casts saturate, so a huge container cannot wrap around.
    Some((per_line as u64).max(1))
}

/// Estimates how many lines the text wraps to inside the container.
///
/// Hard line breaks start a new line; each `\n`-separated segment wraps on its
/// own and reserves at least one line, a trailing `\n` included. `\r` is never
/// counted, so CRLF and LF text estimate alike. Empty text reserves one line.
pub fn estimate_lines(text: &str, style: &SectionStyle, container_width_px: f64) -> u32 {
    let Some(per_line) = chars_per_line(text, style, container_width_px) else {
        return 1;
    };

    let lines: u64 = text
        .split('\n')
        .map(|segment| {
            let chars = segment.chars().filter(|&c| c != '\r').count() as u64;
            chars.div_ceil(per_line).max(1)
        })
        .sum();

    u32::try_from(lines.max(1)).unwrap_or(u32::MAX)
}

/// Estimates the rendered height of `text` in px.
///
/// `height = lines × font_size × line_height + vertical_padding`. Never fails;
/// degenerate styles are normalized rather than producing NaN or negative
/// heights.
pub fn estimate_height(text: &str, style: &SectionStyle, container_width_px: f64) -> f64 {
    estimate(text, style, container_width_px).height_px
}

/// Line count and height in one pass.
pub fn estimate(text: &str, style: &SectionStyle, container_width_px: f64) -> LineEstimate {
    let lines = estimate_lines(text, style, container_width_px);
    LineEstimate {
        lines,
        height_px: f64::from(lines) * style.line_height_px() + style.vertical_padding(),
    }
}

/// `value` when it is a positive finite number, `fallback` otherwise (NaN included).
fn positive_or(value: f64, fallback: f64) -> f64 {
    if value > 0.0 && value.is_finite() {
        value
    } else {
        fallback
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
