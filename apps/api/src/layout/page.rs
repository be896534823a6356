//! Page capacity and page templates.
//!
//! Both are plain numbers in page-local px (96 dpi). A new physical format is
//! a new `PageTemplate` value, never a code change.
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use crate::layout::PlanError;

/// Usable content height of one page.
///
/// `effective_px = content_height_px - safety_margin_px`. The margin is reserved
/// headroom that absorbs estimation error; it is supplied per call because
/// visually similar quiz types have historically needed different margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageCapacity {
    content_height_px: f64,
    safety_margin_px: f64,
}

impl PageCapacity {
    pub fn new(content_height_px: f64, safety_margin_px: f64) -> Result<Self, PlanError> {
        if !content_height_px.is_finite() || content_height_px <= 0.0 {
            return Err(PlanError::InvalidCapacity(format!(
                "content height must be a positive number, got {content_height_px}"
            )));
        }
        if !safety_margin_px.is_finite() || safety_margin_px < 0.0 {
            return Err(PlanError::InvalidCapacity(format!(
                "safety margin must be zero or positive, got {safety_margin_px}"
            )));
        }
        if safety_margin_px >= content_height_px {
            return Err(PlanError::InvalidCapacity(format!(
                "safety margin {safety_margin_px}px leaves no room in a {content_height_px}px page"
            )));
        }
        Ok(Self {
            content_height_px,
            safety_margin_px,
        })
    }

    pub fn content_height_px(&self) -> f64 {
        self.content_height_px
    }

    pub fn safety_margin_px(&self) -> f64 {
        self.safety_margin_px
    }

    pub fn effective_px(&self) -> f64 {
        self.content_height_px - self.safety_margin_px
    }
}

/// Global page template: a header region above a content region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageTemplate {
    /// Printable height inside the physical page margins.
    pub page_height_px: f64,
    /// Height reserved at the top of every page for the worksheet header.
    pub header_height_px: f64,
    /// Width of the content region; the estimator's container width.
    pub content_width_px: f64,
    pub safety_margin_px: f64,
}

impl PageTemplate {
    /// A4 portrait at 96 dpi (794 × 1123) with 40px physical margins.
    pub fn a4_portrait() -> Self {
        Self {
            page_height_px: 1043.0,
            header_height_px: 60.0,
            content_width_px: 714.0,
            safety_margin_px: 50.0,
        }
    }

    /// A4 landscape at 96 dpi (1123 × 794) with 40px physical margins.
    pub fn a4_landscape() -> Self {
        Self {
            page_height_px: 714.0,
            header_height_px: 60.0,
            content_width_px: 1043.0,
            safety_margin_px: 50.0,
        }
    }

    /// Capacity of the content region below the header.
    pub fn capacity(&self) -> Result<PageCapacity, PlanError> {
        PageCapacity::new(
            self.page_height_px - self.header_height_px,
            self.safety_margin_px,
        )
    }
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self::a4_portrait()
    }
}
