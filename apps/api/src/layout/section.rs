//! Section model: atomic content blocks, grouping hints and quiz items.
//!
//! A `QuizItem` is only constructible with a grouping hint that has been
//! resolved against its own section order, so the packer never sees a hint
//! that drops or duplicates a section.
#![allow(dead_code)]

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::text_metrics::{estimate_height, SectionStyle};
use crate::layout::PlanError;

// ────────────────────────────────────────────────────────────────────────────
// Roles
// ────────────────────────────────────────────────────────────────────────────

/// The role a section plays inside a quiz item. Open set: the well-known roles
/// are associated constants, anything else is built with `SectionRole::custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionRole(Cow<'static, str>);

impl SectionRole {
    pub const TITLE: SectionRole = SectionRole(Cow::Borrowed("title"));
    pub const INSTRUCTION: SectionRole = SectionRole(Cow::Borrowed("instruction"));
    pub const BODY: SectionRole = SectionRole(Cow::Borrowed("body"));
    pub const OPTION_LIST: SectionRole = SectionRole(Cow::Borrowed("option_list"));
    pub const ANSWER_LINE: SectionRole = SectionRole(Cow::Borrowed("answer_line"));
    pub const TRANSLATION: SectionRole = SectionRole(Cow::Borrowed("translation"));

    pub fn custom(name: impl Into<String>) -> Self {
        SectionRole(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Content sections
// ────────────────────────────────────────────────────────────────────────────

/// How a section's height is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Measure {
    /// Estimated from the text with the text-metrics heuristic.
    Estimated {
        style: SectionStyle,
        container_width_px: f64,
    },
    /// Pre-measured by the caller (e.g. an image block of known size).
    Fixed { height_px: f64 },
}

/// One atomic, never-split block of print content.
///
/// `estimated_height_px` is computed at construction and recomputed by every
/// setter that changes the text or the measure; nothing else writes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentSection {
    role: SectionRole,
    text: String,
    measure: Measure,
    estimated_height_px: f64,
}

impl ContentSection {
    /// A text section whose height is estimated from `style` at the given width.
    pub fn new(
        role: SectionRole,
        text: impl Into<String>,
        style: SectionStyle,
        container_width_px: f64,
    ) -> Self {
        Self::with_measure(
            role,
            text,
            Measure::Estimated {
                style,
                container_width_px,
            },
        )
    }

    /// A section with a caller-supplied height.
    pub fn fixed(role: SectionRole, text: impl Into<String>, height_px: f64) -> Self {
        Self::with_measure(role, text, Measure::Fixed { height_px })
    }

    pub fn with_measure(role: SectionRole, text: impl Into<String>, measure: Measure) -> Self {
        let mut section = Self {
            role,
            text: text.into(),
            measure,
            estimated_height_px: 0.0,
        };
        section.refresh_height();
        section
    }

    pub fn role(&self) -> &SectionRole {
        &self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn estimated_height_px(&self) -> f64 {
        self.estimated_height_px
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.refresh_height();
    }

    pub fn set_measure(&mut self, measure: Measure) {
        self.measure = measure;
        self.refresh_height();
    }

    fn refresh_height(&mut self) {
        self.estimated_height_px = match &self.measure {
            Measure::Estimated {
                style,
                container_width_px,
            } => estimate_height(&self.text, style, *container_width_px),
            Measure::Fixed { height_px } if height_px.is_finite() => height_px.max(0.0),
            Measure::Fixed { .. } => 0.0,
        };
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Grouping hints
// ────────────────────────────────────────────────────────────────────────────

/// Ordered preference list of role groups that should share a page.
///
/// The list is flat: consecutive groups accumulate until their roles spell out
/// the item's full role sequence, which completes one candidate grouping; the
/// next group starts the next candidate. For sections `[A, B, C]` the hint
/// `[[A, B, C], [A, B], [C]]` holds two candidates, `{ABC}` then `{AB | C}`.
/// Candidates are listed most-inclusive first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupingHint(Vec<Vec<SectionRole>>);

impl GroupingHint {
    pub fn new(groups: Vec<Vec<SectionRole>>) -> Self {
        Self(groups)
    }

    pub fn groups(&self) -> &[Vec<SectionRole>] {
        &self.0
    }

    /// Builds a hint from break candidates.
    ///
    /// Each candidate lists the roles before which a page break is allowed at
    /// that preference level. Roles the item does not have are ignored, and a
    /// candidate that collapses into an earlier one is dropped.
    pub fn from_breakpoints(roles: &[SectionRole], candidates: &[Vec<SectionRole>]) -> Self {
        let mut seen: Vec<Vec<Vec<SectionRole>>> = Vec::new();

        for breaks in candidates {
            let mut runs: Vec<Vec<SectionRole>> = Vec::new();
            for role in roles {
                if runs.is_empty() || breaks.contains(role) {
                    runs.push(vec![role.clone()]);
                } else if let Some(run) = runs.last_mut() {
                    run.push(role.clone());
                }
            }
            if !runs.is_empty() && !seen.contains(&runs) {
                seen.push(runs);
            }
        }

        Self(seen.into_iter().flatten().collect())
    }

    /// Resolves the hint into candidate groupings of section index ranges.
    pub(crate) fn resolve(&self, roles: &[SectionRole]) -> Result<Vec<Grouping>, PlanError> {
        let mut candidates = Vec::new();
        let mut runs = Vec::new();
        let mut cursor = 0usize;

        for (index, group) in self.0.iter().enumerate() {
            if group.is_empty() {
                return Err(PlanError::EmptyGroup { group: index });
            }

            let end = cursor + group.len();
            if end > roles.len() || roles[cursor..end] != group[..] {
                let expected_end = end.min(roles.len());
                return Err(PlanError::HintMismatch {
                    group: index,
                    position: cursor,
                    expected: join_roles(&roles[cursor..expected_end]),
                    found: join_roles(group),
                });
            }

            runs.push(cursor..end);
            cursor = end;

            if cursor == roles.len() {
                candidates.push(Grouping {
                    runs: std::mem::take(&mut runs),
                });
                cursor = 0;
            }
        }

        if cursor != 0 {
            return Err(PlanError::IncompleteHint {
                covered: cursor,
                total: roles.len(),
            });
        }

        Ok(candidates)
    }
}

/// One complete candidate: an ordered partition of an item's sections into
/// contiguous runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    runs: Vec<Range<usize>>,
}

impl Grouping {
    pub fn runs(&self) -> &[Range<usize>] {
        &self.runs
    }
}

fn join_roles(roles: &[SectionRole]) -> String {
    roles
        .iter()
        .map(SectionRole::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ────────────────────────────────────────────────────────────────────────────
// Quiz items
// ────────────────────────────────────────────────────────────────────────────

/// One generated question with its ordered print sections.
#[derive(Debug, Clone, Serialize)]
pub struct QuizItem {
    id: Uuid,
    sections: Vec<ContentSection>,
    grouping_hint: GroupingHint,
    #[serde(skip)]
    candidates: Vec<Grouping>,
}

impl QuizItem {
    /// Validates the hint against the section order. Fails fast on an empty
    /// item or on any group that does not continue the role sequence.
    pub fn new(
        id: Uuid,
        sections: Vec<ContentSection>,
        grouping_hint: GroupingHint,
    ) -> Result<Self, PlanError> {
        if sections.is_empty() {
            return Err(PlanError::EmptyItem);
        }
        let roles: Vec<SectionRole> = sections.iter().map(|s| s.role().clone()).collect();
        let candidates = grouping_hint.resolve(&roles)?;

        Ok(Self {
            id,
            sections,
            grouping_hint,
            candidates,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sections(&self) -> &[ContentSection] {
        &self.sections
    }

    pub fn grouping_hint(&self) -> &GroupingHint {
        &self.grouping_hint
    }

    pub(crate) fn candidates(&self) -> &[Grouping] {
        &self.candidates
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
