use crate::config::Config;
use crate::layout::PageTemplate;
use crate::quiz::Typography;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Default page template; requests may override capacity and width.
    pub template: PageTemplate,
    /// Per-role print styles used when a section arrives without its own style.
    pub typography: Typography,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let template = config.page_template();
        let typography = Typography::worksheet(template.content_width_px);
        Self {
            template,
            typography,
        }
    }
}
