use serde::{Deserialize, Serialize};

/// Sentinel the pickup listing uses for "no filter" in its dropdowns.
pub const FILTER_ALL: &str = "all";

/// Filters that were active on the listing screen. Display only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search_term: Option<String>,
}

impl ReportFilters {
    /// Lines to print under "Applied Filters", in display order.
    ///
    /// Status and priority are skipped when empty or `all`; the search term
    /// only when empty.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(status) = selected(&self.status) {
            lines.push(format!("Status: {status}"));
        }
        if let Some(priority) = selected(&self.priority) {
            lines.push(format!("Priority: {priority}"));
        }
        if let Some(term) = self.search_term.as_deref().filter(|t| !t.is_empty()) {
            lines.push(format!("Search: {term}"));
        }
        lines
    }
}

fn selected(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty() && *v != FILTER_ALL)
}

/// Caller-supplied knobs for the list report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportOptions {
    pub title: Option<String>,
    pub include_filters: bool,
    pub filters: Option<ReportFilters>,
}

impl ReportOptions {
    pub const DEFAULT_TITLE: &'static str = "Pickup List Report";

    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(Self::DEFAULT_TITLE)
    }

    /// Filter lines to render, empty unless `include_filters` is set.
    pub fn filter_lines(&self) -> Vec<String> {
        match (&self.filters, self.include_filters) {
            (Some(filters), true) => filters.summary_lines(),
            _ => Vec::new(),
        }
    }
}
