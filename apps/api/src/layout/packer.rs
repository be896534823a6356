//! Page Packer: decides where page boundaries fall inside one quiz item.
//!
//! # Decision policy
//! - Candidate groupings come from the item's grouping hint, most-inclusive first.
//! - The first candidate whose every run fits the effective capacity wins.
//! - If none fits, fall back to one section per page. A section taller than
//!   the capacity still gets its own page (overflow is accepted, not an error).
//! - One run = one page. Sections are never reordered or split.
//!
//! Each quiz type expresses its own "4-case" preference as a hint; the packer
//! has no per-type branching.
#![allow(dead_code)]

use std::ops::Range;

use serde::Serialize;
use tracing::{debug, warn};

use crate::layout::page::PageCapacity;
use crate::layout::section::{ContentSection, Grouping, GroupingHint, QuizItem, SectionRole};
use crate::layout::PlanError;

/// Slack for float sums of estimated heights.
pub const HEIGHT_TOLERANCE_PX: f64 = 1e-6;

// ────────────────────────────────────────────────────────────────────────────
// Result types
// ────────────────────────────────────────────────────────────────────────────

/// How the packer settled on an item's page layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackVerdict {
    /// A hinted candidate fit; `candidate` is its 0-based position in the hint.
    Merged { candidate: usize },
    /// No candidate fit; one section per page. `overflowing` holds the indices
    /// of sections taller than the effective capacity.
    Atomized { overflowing: Vec<usize> },
}

/// A contiguous run of an item's sections that lands on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRun {
    pub sections: Range<usize>,
    pub height_px: f64,
}

impl PageRun {
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// The packer's decision for a single item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemLayout {
    pub runs: Vec<PageRun>,
    pub verdict: PackVerdict,
}

impl ItemLayout {
    pub fn page_count(&self) -> usize {
        self.runs.len()
    }

    pub fn has_overflow(&self) -> bool {
        matches!(&self.verdict, PackVerdict::Atomized { overflowing } if !overflowing.is_empty())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

/// Packs raw sections with an unvalidated hint.
///
/// The hint is resolved against the section order first; a hint that does not
/// cover every section exactly once is rejected before any packing happens.
pub fn pack(
    sections: &[ContentSection],
    grouping_hint: &GroupingHint,
    capacity: &PageCapacity,
) -> Result<ItemLayout, PlanError> {
    if sections.is_empty() {
        return Err(PlanError::EmptyItem);
    }
    let roles: Vec<SectionRole> = sections.iter().map(|s| s.role().clone()).collect();
    let candidates = grouping_hint.resolve(&roles)?;
    Ok(pack_resolved(sections, &candidates, capacity))
}

/// Packs an already-validated item.
pub fn pack_item(item: &QuizItem, capacity: &PageCapacity) -> ItemLayout {
    pack_resolved(item.sections(), item.candidates(), capacity)
}

// ────────────────────────────────────────────────────────────────────────────
// Core algorithm
// ────────────────────────────────────────────────────────────────────────────

fn pack_resolved(
    sections: &[ContentSection],
    candidates: &[Grouping],
    capacity: &PageCapacity,
) -> ItemLayout {
    let limit = capacity.effective_px();

    for (index, grouping) in candidates.iter().enumerate() {
        let runs = measure_runs(sections, grouping.runs());
        if runs.iter().all(|run| fits(run.height_px, limit)) {
            debug!(
                candidate = index,
                pages = runs.len(),
                "Packer accepted hinted grouping"
            );
            return ItemLayout {
                runs,
                verdict: PackVerdict::Merged { candidate: index },
            };
        }
    }

    let runs: Vec<PageRun> = sections
        .iter()
        .enumerate()
        .map(|(i, section)| PageRun {
            sections: i..i + 1,
            height_px: section.estimated_height_px(),
        })
        .collect();

    let overflowing: Vec<usize> = runs
        .iter()
        .filter(|run| !fits(run.height_px, limit))
        .map(|run| run.sections.start)
        .collect();

    if overflowing.is_empty() {
        debug!(
            candidates = candidates.len(),
            pages = runs.len(),
            "Packer fell back to one section per page"
        );
    } else {
        warn!(
            overflowing = ?overflowing,
            capacity_px = limit,
            "Sections taller than page capacity placed alone"
        );
    }

    ItemLayout {
        runs,
        verdict: PackVerdict::Atomized { overflowing },
    }
}

fn measure_runs(sections: &[ContentSection], ranges: &[Range<usize>]) -> Vec<PageRun> {
    ranges
        .iter()
        .map(|range| PageRun {
            sections: range.clone(),
            height_px: sections[range.clone()]
                .iter()
                .map(ContentSection::estimated_height_px)
                .sum(),
        })
        .collect()
}

/// True if `height_px` fits under `limit_px`, allowing float-sum slack.
pub(crate) fn fits(height_px: f64, limit_px: f64) -> bool {
    height_px <= limit_px + HEIGHT_TOLERANCE_PX
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn role(name: &str) -> SectionRole {
        SectionRole::custom(name)
    }

    fn sections(heights: &[f64]) -> Vec<ContentSection> {
        heights
            .iter()
            .enumerate()
            .map(|(i, &h)| ContentSection::fixed(role(&format!("s{i}")), format!("section {i}"), h))
            .collect()
    }

    fn roles_of(sections: &[ContentSection]) -> Vec<SectionRole> {
        sections.iter().map(|s| s.role().clone()).collect()
    }

    fn capacity(px: f64) -> PageCapacity {
        PageCapacity::new(px, 0.0).unwrap()
    }

    fn abc_hint() -> GroupingHint {
        GroupingHint::new(vec![
            vec![role("s0"), role("s1"), role("s2")],
            vec![role("s0"), role("s1")],
            vec![role("s2")],
        ])
    }

    fn ranges(layout: &ItemLayout) -> Vec<Range<usize>> {
        layout.runs.iter().map(|r| r.sections.clone()).collect()
    }

    /// Every "break before" subset of the sections, ordered by page count.
    fn exhaustive_hint(roles: &[SectionRole]) -> GroupingHint {
        let gaps = roles.len().saturating_sub(1);
        let mut masks: Vec<u32> = (0..(1u32 << gaps)).collect();
        masks.sort_by_key(|m| (m.count_ones(), *m));
        let candidates: Vec<Vec<SectionRole>> = masks
            .into_iter()
            .map(|mask| {
                (0..gaps)
                    .filter(|g| mask & (1 << g) != 0)
                    .map(|g| roles[g + 1].clone())
                    .collect()
            })
            .collect();
        GroupingHint::from_breakpoints(roles, &candidates)
    }

    // ── worked scenarios ────────────────────────────────────────────────────

    #[test]
    fn test_everything_fits_on_one_page() {
        let secs = sections(&[100.0, 150.0, 200.0]);
        let hint = GroupingHint::new(vec![vec![role("s0"), role("s1"), role("s2")]]);
        let layout = pack(&secs, &hint, &capacity(500.0)).unwrap();
        assert_eq!(ranges(&layout), vec![0..3]);
        assert_eq!(layout.verdict, PackVerdict::Merged { candidate: 0 });
        assert_eq!(layout.runs[0].height_px, 450.0);
    }

    #[test]
    fn test_second_candidate_splits_into_two_pages() {
        let secs = sections(&[100.0, 150.0, 200.0]);
        let layout = pack(&secs, &abc_hint(), &capacity(300.0)).unwrap();
        assert_eq!(ranges(&layout), vec![0..2, 2..3]);
        assert_eq!(layout.verdict, PackVerdict::Merged { candidate: 1 });
        assert_eq!(layout.runs[0].height_px, 250.0);
        assert_eq!(layout.runs[1].height_px, 200.0);
    }

    #[test]
    fn test_oversized_single_section_is_accepted_overflow() {
        let secs = sections(&[900.0]);
        let layout = pack(&secs, &GroupingHint::default(), &capacity(500.0)).unwrap();
        assert_eq!(ranges(&layout), vec![0..1]);
        assert_eq!(
            layout.verdict,
            PackVerdict::Atomized {
                overflowing: vec![0]
            }
        );
        assert!(layout.has_overflow());
    }

    // ── fallback ────────────────────────────────────────────────────────────

    #[test]
    fn test_falls_back_to_one_section_per_page() {
        let secs = sections(&[250.0, 250.0, 250.0]);
        let layout = pack(&secs, &abc_hint(), &capacity(300.0)).unwrap();
        assert_eq!(ranges(&layout), vec![0..1, 1..2, 2..3]);
        assert_eq!(
            layout.verdict,
            PackVerdict::Atomized {
                overflowing: vec![]
            }
        );
        assert!(!layout.has_overflow());
    }

    #[test]
    fn test_overflow_section_isolated_among_normal_ones() {
        let secs = sections(&[100.0, 800.0, 100.0]);
        let layout = pack(&secs, &abc_hint(), &capacity(500.0)).unwrap();
        assert_eq!(layout.page_count(), 3);
        assert_eq!(
            layout.verdict,
            PackVerdict::Atomized {
                overflowing: vec![1]
            }
        );
    }

    #[test]
    fn test_empty_hint_goes_straight_to_fallback() {
        let secs = sections(&[10.0, 10.0]);
        let layout = pack(&secs, &GroupingHint::default(), &capacity(500.0)).unwrap();
        assert_eq!(layout.page_count(), 2);
    }

    // ── capacity edge cases ─────────────────────────────────────────────────

    #[test]
    fn test_run_exactly_at_capacity_fits() {
        let secs = sections(&[150.0, 150.0, 200.0]);
        let layout = pack(&secs, &abc_hint(), &capacity(300.0)).unwrap();
        assert_eq!(layout.verdict, PackVerdict::Merged { candidate: 1 });
    }

    #[test]
    fn test_float_sum_noise_does_not_flip_decision() {
        // 0.1 + 0.2 > 0.3 in f64; the tolerance must absorb it.
        let secs = sections(&[0.1, 0.2]);
        let hint = GroupingHint::new(vec![vec![role("s0"), role("s1")]]);
        let layout = pack(&secs, &hint, &capacity(0.3)).unwrap();
        assert_eq!(layout.page_count(), 1);
    }

    #[test]
    fn test_safety_margin_reduces_capacity() {
        let secs = sections(&[100.0, 150.0, 200.0]);
        let roomy = PageCapacity::new(500.0, 0.0).unwrap();
        let tight = PageCapacity::new(500.0, 100.0).unwrap();
        assert_eq!(pack(&secs, &abc_hint(), &roomy).unwrap().page_count(), 1);
        assert_eq!(pack(&secs, &abc_hint(), &tight).unwrap().page_count(), 2);
    }

    // ── validation ──────────────────────────────────────────────────────────

    #[test]
    fn test_pack_rejects_hint_that_drops_a_section() {
        let secs = sections(&[100.0, 150.0, 200.0]);
        let hint = GroupingHint::new(vec![vec![role("s0"), role("s1")]]);
        let err = pack(&secs, &hint, &capacity(500.0)).unwrap_err();
        assert!(matches!(err, PlanError::IncompleteHint { covered: 2, total: 3 }));
    }

    #[test]
    fn test_pack_rejects_empty_sections() {
        let err = pack(&[], &GroupingHint::default(), &capacity(500.0)).unwrap_err();
        assert_eq!(err, PlanError::EmptyItem);
    }

    #[test]
    fn test_pack_item_matches_pack() {
        let secs = sections(&[100.0, 150.0, 200.0]);
        let item = QuizItem::new(uuid::Uuid::new_v4(), secs.clone(), abc_hint()).unwrap();
        let cap = capacity(300.0);
        assert_eq!(pack_item(&item, &cap), pack(&secs, &abc_hint(), &cap).unwrap());
    }

    // ── determinism ─────────────────────────────────────────────────────────

    #[test]
    fn test_pack_is_deterministic() {
        let secs = sections(&[120.0, 340.0, 80.0, 410.0]);
        let hint = exhaustive_hint(&roles_of(&secs));
        let cap = capacity(450.0);
        let first = pack(&secs, &hint, &cap).unwrap();
        let second = pack(&secs, &hint, &cap).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_exhaustive_hint_finds_fewest_pages() {
        // No 2-page split fits 450px; [0] [1,2] [3] = 120, 420, 410 does.
        let secs = sections(&[120.0, 340.0, 80.0, 410.0]);
        let hint = exhaustive_hint(&roles_of(&secs));
        let layout = pack(&secs, &hint, &capacity(450.0)).unwrap();
        assert_eq!(layout.page_count(), 3);
        assert!(matches!(layout.verdict, PackVerdict::Merged { .. }));
    }

    // ── properties ──────────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn prop_no_section_lost_or_duplicated(
            heights in prop::collection::vec(0.0f64..700.0, 1..7),
            cap in 50.0f64..1200.0,
        ) {
            let secs = sections(&heights);
            let hint = exhaustive_hint(&roles_of(&secs));
            let layout = pack(&secs, &hint, &capacity(cap)).unwrap();

            let covered: Vec<usize> = layout.runs.iter().flat_map(|r| r.sections.clone()).collect();
            let expected: Vec<usize> = (0..secs.len()).collect();
            prop_assert_eq!(covered, expected);
            prop_assert!(layout.runs.iter().all(|r| !r.is_empty()));
        }

        #[test]
        fn prop_pages_respect_capacity_unless_single_overflow(
            heights in prop::collection::vec(0.0f64..700.0, 1..7),
            cap in 50.0f64..1200.0,
        ) {
            let secs = sections(&heights);
            let hint = exhaustive_hint(&roles_of(&secs));
            let layout = pack(&secs, &hint, &capacity(cap)).unwrap();

            let overflowing = match &layout.verdict {
                PackVerdict::Atomized { overflowing } => overflowing.clone(),
                PackVerdict::Merged { .. } => Vec::new(),
            };
            for run in &layout.runs {
                if !fits(run.height_px, cap) {
                    prop_assert_eq!(run.len(), 1);
                    prop_assert!(overflowing.contains(&run.sections.start));
                }
            }
        }

        #[test]
        fn prop_more_capacity_never_adds_pages(
            heights in prop::collection::vec(0.0f64..700.0, 1..7),
            cap in 50.0f64..1000.0,
            extra in 0.0f64..500.0,
        ) {
            let secs = sections(&heights);
            let hint = exhaustive_hint(&roles_of(&secs));
            let small = pack(&secs, &hint, &capacity(cap)).unwrap();
            let large = pack(&secs, &hint, &capacity(cap + extra)).unwrap();
            prop_assert!(large.page_count() <= small.page_count());
        }
    }
}
