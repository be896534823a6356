// Print pagination engine.
// Implements: text-height estimation, ordered-section page packing, document composition.
// Everything below `handlers` is pure and synchronous; handlers run composition
// inside tokio::task::spawn_blocking.

pub mod composer;
pub mod handlers;
pub mod packer;
pub mod page;
pub mod section;
pub mod text_metrics;

use thiserror::Error;

// Re-export the public API consumed by other modules (quiz builders, handlers, state).
pub use composer::{compose, PagePlan};
pub use page::{PageCapacity, PageTemplate};
pub use section::{ContentSection, GroupingHint, QuizItem, SectionRole};
pub use text_metrics::{LineEstimate, SectionStyle};

/// Invariant violations caught while building items or capacities.
///
/// These are caller bugs, reported at construction time so that a plan never
/// silently drops or duplicates a section.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("quiz item has no sections")]
    EmptyItem,

    #[error("grouping hint group {group} is empty")]
    EmptyGroup { group: usize },

    #[error(
        "grouping hint group {group} [{found}] does not continue the section order \
         at position {position} (expected [{expected}])"
    )]
    HintMismatch {
        group: usize,
        position: usize,
        expected: String,
        found: String,
    },

    #[error("grouping hint ends mid-candidate: {covered} of {total} sections covered")]
    IncompleteHint { covered: usize, total: usize },

    #[error("invalid page capacity: {0}")]
    InvalidCapacity(String),

    #[error("item {index}: {source}")]
    Item {
        index: usize,
        #[source]
        source: Box<PlanError>,
    },
}

impl PlanError {
    /// Attaches the position of the offending item in a batch.
    pub fn for_item(self, index: usize) -> Self {
        PlanError::Item {
            index,
            source: Box::new(self),
        }
    }
}
