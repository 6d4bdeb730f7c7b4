//! Plain-text rendering of listing pages.

use std::fmt::Write as _;

use serde::Serialize;

use crate::api::{ApiError, TagPage};
use crate::listing::{FacetSet, Listable, Page};
use crate::types::{CaseStudy, Language, Update};
use crate::util::{fit_width, format_date};

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// A fixed-width text column.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub width: usize,
}

/// Something that renders as one table row.
pub trait TableRow: Listable {
    fn columns() -> &'static [Column];
    fn cells(&self, lang: Language, date_format: &str) -> Vec<String>;
}

const CASE_STUDY_COLUMNS: &[Column] = &[
    Column { header: "#", width: 4 },
    Column { header: "Date", width: 10 },
    Column { header: "Title", width: 36 },
    Column { header: "Client", width: 18 },
    Column { header: "Industry", width: 14 },
    Column { header: "Tags", width: 24 },
];

const UPDATE_COLUMNS: &[Column] = &[
    Column { header: "#", width: 4 },
    Column { header: "Date", width: 10 },
    Column { header: "Priority", width: 9 },
    Column { header: "Title", width: 40 },
    Column { header: "Category", width: 16 },
    Column { header: "Change", width: 12 },
];

impl TableRow for CaseStudy {
    fn columns() -> &'static [Column] {
        CASE_STUDY_COLUMNS
    }

    fn cells(&self, lang: Language, date_format: &str) -> Vec<String> {
        vec![
            format_date(self.published(), date_format),
            featured_title(self.title.get(lang), self.featured),
            self.client_name.clone(),
            self.industry.clone().unwrap_or_default(),
            self.tags.join(", "),
        ]
    }
}

impl TableRow for Update {
    fn columns() -> &'static [Column] {
        UPDATE_COLUMNS
    }

    fn cells(&self, lang: Language, date_format: &str) -> Vec<String> {
        vec![
            format_date(self.published(), date_format),
            self.priority.to_string(),
            featured_title(self.title.get(lang), self.featured),
            self.update_category.clone().unwrap_or_default(),
            self.change_type.clone().unwrap_or_default(),
        ]
    }
}

fn featured_title(title: &str, featured: bool) -> String {
    if featured {
        format!("★ {title}")
    } else {
        title.to_owned()
    }
}

fn render_row(columns: &[Column], cells: &[String]) -> String {
    columns
        .iter()
        .zip(cells)
        .map(|(col, cell)| fit_width(cell, col.width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_owned()
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Render `page` as a table followed by a pagination footer.
pub fn render_page<T: TableRow>(page: &Page<'_, T>, lang: Language, date_format: &str) -> String {
    let mut out = String::new();
    if page.is_empty() {
        out.push_str(&render_footer(page));
        return out;
    }

    let columns = T::columns();
    let headers: Vec<String> = columns.iter().map(|c| c.header.to_owned()).collect();
    let _ = writeln!(out, "{}", render_row(columns, &headers));
    let rule_width = columns.iter().map(|c| c.width + 2).sum::<usize>().saturating_sub(2);
    let _ = writeln!(out, "{}", "─".repeat(rule_width));

    for (offset, item) in page.items.iter().enumerate() {
        let mut cells = vec![(page.first_index() + offset).to_string()];
        cells.extend(item.cells(lang, date_format));
        let _ = writeln!(out, "{}", render_row(columns, &cells));
    }
    out.push_str(&render_footer(page));
    out
}

/// `Page x of y` line, or the no-results affordance.
pub fn render_footer<T>(page: &Page<'_, T>) -> String {
    if page.is_empty() {
        return "No results match the current filters. Type `clear` to reset them.\n".to_owned();
    }
    let last = page.first_index() + page.items.len() - 1;
    let mut line = format!(
        "Showing {}-{last} of {} · Page {} of {}",
        page.first_index(),
        page.total_items,
        page.number,
        page.total_pages
    );
    match (page.has_prev(), page.has_next()) {
        (true, true) => line.push_str("  [prev] [next]"),
        (true, false) => line.push_str("  [prev]"),
        (false, true) => line.push_str("  [next]"),
        (false, false) => {}
    }
    line.push('\n');
    line
}

/// JSON form of a page, for `--json`.
pub fn render_json<T: Serialize>(page: &Page<'_, T>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(page)
}

pub fn render_tag_header(page: &TagPage) -> String {
    let mut out = format!("Case studies tagged \"{}\" ({})\n", page.tag, page.items.len());
    if !page.related.is_empty() {
        let _ = writeln!(out, "Related tags: {}", page.related.join(", "));
    }
    out
}

/// One line per facet: `industry: Automotive, Medical`.
pub fn render_facets(facets: &FacetSet) -> String {
    let mut out = String::new();
    for facet in facets.facets() {
        let values: Vec<&str> = facets.values(facet).collect();
        let shown = if values.is_empty() {
            "(none)".to_owned()
        } else {
            values.join(", ")
        };
        let _ = writeln!(out, "{facet}: {shown}");
    }
    out
}

pub fn render_error(error: &ApiError) -> String {
    format!("{}\n  ({error})\n", error.user_message())
}
