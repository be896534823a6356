//! Section Model Builder: maps quiz-type content models onto print sections.
//!
//! Each quiz type implements `PrintableQuiz`: its ordered `(role, text)` parts
//! plus the page-break candidates it tolerates, most-inclusive first. The
//! builder attaches height estimates from the per-role `Typography` table and
//! turns the break candidates into a validated `GroupingHint`.

pub mod drill;
pub mod handlers;
pub mod passage;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::text_metrics::ScriptHint;
use crate::layout::{ContentSection, GroupingHint, PlanError, QuizItem, SectionRole, SectionStyle};

pub use drill::SentenceDrill;
pub use passage::PassageQuestion;

// ────────────────────────────────────────────────────────────────────────────
// Typography
// ────────────────────────────────────────────────────────────────────────────

/// Per-role print styles plus the content width they are laid out in.
#[derive(Debug, Clone)]
pub struct Typography {
    styles: HashMap<SectionRole, SectionStyle>,
    fallback: SectionStyle,
    container_width_px: f64,
}

impl Typography {
    /// Worksheet defaults: a bold title, a padded instruction banner, body copy
    /// at 16px/1.7, and a boxed translation block in the learner's script.
    pub fn worksheet(container_width_px: f64) -> Self {
        let styles = HashMap::from([
            (
                SectionRole::TITLE,
                SectionStyle::new(20.0, 1.4).with_padding(0.0, 12.0),
            ),
            (
                SectionRole::INSTRUCTION,
                SectionStyle::new(15.0, 1.6).with_padding(24.0, 16.0),
            ),
            (SectionRole::BODY, SectionStyle::new(16.0, 1.7)),
            (
                SectionRole::OPTION_LIST,
                SectionStyle::new(16.0, 1.7).with_padding(16.0, 8.0),
            ),
            (
                SectionRole::ANSWER_LINE,
                SectionStyle::new(14.0, 1.6).with_padding(0.0, 8.0),
            ),
            (
                SectionRole::TRANSLATION,
                SectionStyle::new(14.0, 1.6)
                    .with_padding(24.0, 16.0)
                    .with_script(ScriptHint::Wide),
            ),
        ]);

        Self {
            styles,
            fallback: SectionStyle::default(),
            container_width_px,
        }
    }

    pub fn with_container_width(mut self, container_width_px: f64) -> Self {
        self.container_width_px = container_width_px;
        self
    }

    pub fn container_width_px(&self) -> f64 {
        self.container_width_px
    }

    /// Style for `role`; unknown roles get the body fallback.
    pub fn style_for(&self, role: &SectionRole) -> SectionStyle {
        self.styles.get(role).copied().unwrap_or(self.fallback)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quiz-type seam
// ────────────────────────────────────────────────────────────────────────────

/// A quiz type that can be printed.
///
/// `parts` must be in print order and omit absent content (an empty
/// translation is not a section). `break_candidates` lists, per preference
/// level, the roles before which a page break is allowed. Roles the item
/// lacks are ignored; the builder always keeps one-section-per-page as the
/// final fallback.
pub trait PrintableQuiz {
    fn id(&self) -> Uuid;
    fn parts(&self) -> Vec<(SectionRole, String)>;
    fn break_candidates(&self) -> Vec<Vec<SectionRole>>;
}

/// The standard worksheet preference:
/// 1. everything on one page
/// 2. translation on its own page
/// 3. title, instruction and passage first; options, answer and translation next
/// 4. passage / options+answer / translation
pub fn standard_break_candidates() -> Vec<Vec<SectionRole>> {
    vec![
        vec![],
        vec![SectionRole::TRANSLATION],
        vec![SectionRole::OPTION_LIST],
        vec![SectionRole::OPTION_LIST, SectionRole::TRANSLATION],
    ]
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Turns raw content into height-annotated sections and validated items.
#[derive(Debug, Clone)]
pub struct SectionBuilder {
    typography: Typography,
}

impl SectionBuilder {
    pub fn new(typography: Typography) -> Self {
        Self { typography }
    }

    /// A section estimated with the role's default style.
    pub fn section(&self, role: SectionRole, text: impl Into<String>) -> ContentSection {
        let style = self.typography.style_for(&role);
        self.styled(role, text, style)
    }

    /// A section estimated with an explicit style.
    pub fn styled(
        &self,
        role: SectionRole,
        text: impl Into<String>,
        style: SectionStyle,
    ) -> ContentSection {
        ContentSection::new(role, text, style, self.typography.container_width_px())
    }

    /// Builds a validated item from a quiz type.
    pub fn build<Q: PrintableQuiz + ?Sized>(&self, quiz: &Q) -> Result<QuizItem, PlanError> {
        let sections: Vec<ContentSection> = quiz
            .parts()
            .into_iter()
            .map(|(role, text)| self.section(role, text))
            .collect();
        let roles: Vec<SectionRole> = sections.iter().map(|s| s.role().clone()).collect();
        let hint = GroupingHint::from_breakpoints(&roles, &quiz.break_candidates());
        QuizItem::new(quiz.id(), sections, hint)
    }

    /// Builds a batch, tagging any failure with the offending item's position.
    pub fn build_all<Q: PrintableQuiz>(&self, quizzes: &[Q]) -> Result<Vec<QuizItem>, PlanError> {
        quizzes
            .iter()
            .enumerate()
            .map(|(index, quiz)| self.build(quiz).map_err(|e| e.for_item(index)))
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tagged quiz content (HTTP input)
// ────────────────────────────────────────────────────────────────────────────

/// Any supported quiz type, tagged by `"type"` in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuizContent {
    Passage(PassageQuestion),
    Drill(SentenceDrill),
}

impl PrintableQuiz for QuizContent {
    fn id(&self) -> Uuid {
        match self {
            QuizContent::Passage(q) => q.id(),
            QuizContent::Drill(q) => q.id(),
        }
    }

    fn parts(&self) -> Vec<(SectionRole, String)> {
        match self {
            QuizContent::Passage(q) => q.parts(),
            QuizContent::Drill(q) => q.parts(),
        }
    }

    fn break_candidates(&self) -> Vec<Vec<SectionRole>> {
        match self {
            QuizContent::Passage(q) => q.break_candidates(),
            QuizContent::Drill(q) => q.break_candidates(),
        }
    }
}

/// Joins list entries one per line, numbered from 1.
pub(crate) fn numbered_lines(entries: &[String]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}. {}", i + 1, entry.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pushes `(role, text)` unless the text is blank.
pub(crate) fn push_part(parts: &mut Vec<(SectionRole, String)>, role: SectionRole, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        parts.push((role, text.to_string()));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
