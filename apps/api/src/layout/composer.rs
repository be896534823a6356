//! Document Composer: sequences per-item page runs into one print plan.
//!
//! Every item starts on a fresh page. Trailing space on an item's last page
//! is never shared with the next item, so a plan can be re-rendered item by
//! item without re-packing its neighbours.
#![allow(dead_code)]

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::layout::packer::{fits, pack_item, PackVerdict};
use crate::layout::page::{PageCapacity, PageTemplate};
use crate::layout::section::{ContentSection, QuizItem};
use crate::layout::PlanError;

// ────────────────────────────────────────────────────────────────────────────
// Plan types
// ────────────────────────────────────────────────────────────────────────────

/// How full a page is against the effective capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageFill {
    pub used_px: f64,
    pub capacity_px: f64,
    /// `used / capacity`; above 1.0 only for an overflow page.
    pub fill_ratio: f64,
    pub overflow: bool,
}

/// The slice of one item's sections placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageAssignment {
    pub item_id: Uuid,
    /// Position of the item in the composed input.
    pub item_index: usize,
    /// Index of `sections[0]` within the item.
    pub first_section: usize,
    pub sections: Vec<ContentSection>,
}

/// One printed page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// 1-based page number within the document.
    pub number: usize,
    /// The render adapter must force a page break before this page.
    pub break_before: bool,
    pub assignments: Vec<PageAssignment>,
    pub fill: PageFill,
}

/// Where an item landed in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub item_id: Uuid,
    /// 1-based number of the item's first page.
    pub first_page: usize,
    pub page_count: usize,
    pub verdict: PackVerdict,
}

/// The full page/section assignment handed to the render adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagePlan {
    pub pages: Vec<Page>,
    pub items: Vec<ItemSummary>,
    pub capacity: PageCapacity,
    pub total_pages: usize,
    pub overflow_pages: usize,
}

impl PagePlan {
    /// All sections in page order, then in-page order.
    pub fn sections_in_order(&self) -> impl Iterator<Item = &ContentSection> {
        self.pages
            .iter()
            .flat_map(|page| page.assignments.iter())
            .flat_map(|assignment| assignment.sections.iter())
    }

    /// 1-based numbers of the pages that force a break before them.
    pub fn page_breaks(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|page| page.break_before)
            .map(|page| page.number)
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Composition
// ────────────────────────────────────────────────────────────────────────────

/// Packs each item in order and concatenates the resulting pages.
pub fn compose(items: &[QuizItem], capacity: &PageCapacity) -> PagePlan {
    let limit = capacity.effective_px();
    let mut pages: Vec<Page> = Vec::new();
    let mut summaries: Vec<ItemSummary> = Vec::with_capacity(items.len());

    for (item_index, item) in items.iter().enumerate() {
        let layout = pack_item(item, capacity);

        summaries.push(ItemSummary {
            item_id: item.id(),
            first_page: pages.len() + 1,
            page_count: layout.page_count(),
            verdict: layout.verdict.clone(),
        });

        for run in layout.runs {
            let number = pages.len() + 1;
            pages.push(Page {
                number,
                break_before: number > 1,
                assignments: vec![PageAssignment {
                    item_id: item.id(),
                    item_index,
                    first_section: run.sections.start,
                    sections: item.sections()[run.sections.clone()].to_vec(),
                }],
                fill: page_fill(run.height_px, limit),
            });
        }
    }

    let overflow_pages = pages.iter().filter(|page| page.fill.overflow).count();

    info!(
        items = items.len(),
        pages = pages.len(),
        overflow_pages,
        "Composed print plan"
    );

    PagePlan {
        total_pages: pages.len(),
        overflow_pages,
        pages,
        items: summaries,
        capacity: *capacity,
    }
}

/// Composes against the content region of a page template.
pub fn compose_with_template(
    items: &[QuizItem],
    template: &PageTemplate,
) -> Result<PagePlan, PlanError> {
    let capacity = template.capacity()?;
    Ok(compose(items, &capacity))
}

fn page_fill(used_px: f64, capacity_px: f64) -> PageFill {
    PageFill {
        used_px,
        capacity_px,
        fill_ratio: used_px / capacity_px,
        overflow: !fits(used_px, capacity_px),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::section::{GroupingHint, SectionRole};
    use crate::layout::text_metrics::SectionStyle;

    fn role(name: &str) -> SectionRole {
        SectionRole::custom(name)
    }

    fn abc_item(heights: [f64; 3]) -> QuizItem {
        let sections = vec![
            ContentSection::fixed(role("a"), "A", heights[0]),
            ContentSection::fixed(role("b"), "B", heights[1]),
            ContentSection::fixed(role("c"), "C", heights[2]),
        ];
        let hint = GroupingHint::new(vec![
            vec![role("a"), role("b"), role("c")],
            vec![role("a"), role("b")],
            vec![role("c")],
        ]);
        QuizItem::new(Uuid::new_v4(), sections, hint).unwrap()
    }

    fn capacity(px: f64) -> PageCapacity {
        PageCapacity::new(px, 0.0).unwrap()
    }

    // ── compose ─────────────────────────────────────────────────────────────

    #[test]
    fn test_two_items_two_pages_each() {
        let items = vec![abc_item([100.0, 150.0, 200.0]), abc_item([100.0, 150.0, 200.0])];
        let plan = compose(&items, &capacity(300.0));

        assert_eq!(plan.total_pages, 4);
        assert_eq!(plan.pages.len(), 4);
        for page in &plan.pages {
            assert_eq!(page.assignments.len(), 1, "items never share a page");
        }
        let owners: Vec<usize> = plan
            .pages
            .iter()
            .map(|p| p.assignments[0].item_index)
            .collect();
        assert_eq!(owners, vec![0, 0, 1, 1]);
        assert_eq!(plan.items[0].first_page, 1);
        assert_eq!(plan.items[1].first_page, 3);
        assert_eq!(plan.items[1].page_count, 2);
    }

    #[test]
    fn test_small_items_still_start_fresh_pages() {
        let items = vec![abc_item([10.0, 10.0, 10.0]), abc_item([10.0, 10.0, 10.0])];
        let plan = compose(&items, &capacity(1000.0));
        assert_eq!(plan.total_pages, 2);
        assert!(plan.pages[0].fill.fill_ratio < 0.1);
    }

    #[test]
    fn test_page_breaks_before_every_page_after_the_first() {
        let items = vec![abc_item([100.0, 150.0, 200.0]), abc_item([400.0, 10.0, 10.0])];
        let plan = compose(&items, &capacity(300.0));
        assert!(!plan.pages[0].break_before);
        assert!(plan.pages[1..].iter().all(|p| p.break_before));
        assert_eq!(plan.page_breaks(), (2..=plan.total_pages).collect::<Vec<_>>());
        let numbers: Vec<usize> = plan.pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, (1..=plan.total_pages).collect::<Vec<_>>());
    }

    #[test]
    fn test_sections_reproduce_item_order() {
        let items = vec![abc_item([100.0, 150.0, 200.0]), abc_item([250.0, 250.0, 250.0])];
        let plan = compose(&items, &capacity(300.0));

        let planned: Vec<&str> = plan.sections_in_order().map(|s| s.text()).collect();
        let expected: Vec<&str> = items
            .iter()
            .flat_map(|item| item.sections().iter().map(|s| s.text()))
            .collect();
        assert_eq!(planned, expected);

        for page in &plan.pages {
            let assignment = &page.assignments[0];
            let item = &items[assignment.item_index];
            let start = assignment.first_section;
            assert_eq!(
                &item.sections()[start..start + assignment.sections.len()],
                &assignment.sections[..]
            );
        }
    }

    #[test]
    fn test_overflow_pages_are_counted() {
        let items = vec![abc_item([900.0, 100.0, 100.0])];
        let plan = compose(&items, &capacity(500.0));
        assert_eq!(plan.total_pages, 3);
        assert_eq!(plan.overflow_pages, 1);
        assert!(plan.pages[0].fill.overflow);
        assert!(plan.pages[0].fill.fill_ratio > 1.0);
        assert!(!plan.pages[1].fill.overflow);
        assert_eq!(
            plan.items[0].verdict,
            PackVerdict::Atomized {
                overflowing: vec![0]
            }
        );
    }

    #[test]
    fn test_empty_input_gives_empty_plan() {
        let plan = compose(&[], &capacity(500.0));
        assert_eq!(plan.total_pages, 0);
        assert!(plan.items.is_empty());
        assert!(plan.page_breaks().is_empty());
    }

    #[test]
    fn test_compose_is_idempotent() {
        let items = vec![abc_item([100.0, 150.0, 200.0]), abc_item([300.0, 20.0, 20.0])];
        let cap = capacity(300.0);
        assert_eq!(compose(&items, &cap), compose(&items, &cap));
    }

    // ── compose_with_template ───────────────────────────────────────────────

    #[test]
    fn test_template_capacity_applied() {
        let template = PageTemplate::a4_portrait();
        let style = SectionStyle::new(16.0, 1.7);
        let width = template.content_width_px;
        let sections = vec![
            ContentSection::new(SectionRole::BODY, "a".repeat(2000), style, width),
            ContentSection::new(SectionRole::TRANSLATION, "가".repeat(800), style, width),
        ];
        let hint = GroupingHint::new(vec![
            vec![SectionRole::BODY, SectionRole::TRANSLATION],
        ]);
        let item = QuizItem::new(Uuid::new_v4(), sections, hint).unwrap();

        let plan = compose_with_template(&[item], &template).unwrap();
        // 25 lines (680px) + 19 lines (516.8px) exceeds 933px, so two pages.
        assert_eq!(plan.total_pages, 2);
        assert_eq!(plan.capacity.effective_px(), 933.0);
        assert_eq!(plan.overflow_pages, 0);
    }

    #[test]
    fn test_plan_serializes_for_render_adapter() {
        let plan = compose(&[abc_item([100.0, 150.0, 200.0])], &capacity(300.0));
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["total_pages"], 2);
        assert_eq!(json["pages"][1]["break_before"], true);
        assert_eq!(json["pages"][1]["assignments"][0]["first_section"], 2);
        assert_eq!(json["items"][0]["verdict"]["kind"], "merged");
        assert_eq!(json["items"][0]["verdict"]["candidate"], 1);
    }
}
