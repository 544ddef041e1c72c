use serde::{Deserialize, Serialize};

use super::assemble::Document;
use super::clean::collapse_blank_runs;
use super::matcher::SectionSpan;
use super::numbering;
use super::title;

const MIN_BODY_CHARS: usize = 3;

/// One recovered section, in the shape downstream consumers read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub parent_section: String,
    pub section: String,
    pub section_title: Option<String>,
    pub section_body_text: Option<String>,
    pub section_start_page: usize,
    pub section_end_page: usize,
}

impl Section {
    pub fn depth(&self) -> usize {
        numbering::depth(&self.section)
    }
}

/// Split a span into title/body, attach pages and parent.
pub fn build_section(doc: &Document, span: &SectionSpan) -> Section {
    let m = &span.matched;
    let trailing = span.trailing.trim();
    let leading = m.leading_text.as_str();

    let (section_title, body) = if title::is_title(leading) {
        (Some(leading.to_string()), non_empty(trailing))
    } else if leading.is_empty() {
        (None, non_empty(trailing))
    } else if trailing.is_empty() {
        (None, Some(leading.to_string()))
    } else {
        (None, Some(format!("{}\n{}", leading, trailing)))
    };

    Section {
        parent_section: numbering::parent(&m.number),
        section: m.number.clone(),
        section_title,
        section_body_text: body.and_then(|b| normalize_body(&b)),
        section_start_page: doc.page_for_offset(m.match_start),
        section_end_page: doc.page_for_offset(span.end.saturating_sub(1)),
    }
}

/// Sections ordered by the integer tuple of their number.
pub fn sort_sections(sections: &mut [Section]) {
    sections.sort_by_cached_key(|s| numbering::sort_key(&s.section));
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// At most one blank line in a row; bodies under three characters are dropped.
fn normalize_body(body: &str) -> Option<String> {
    let collapsed = collapse_blank_runs(body);
    let trimmed = collapsed.trim();
    if trimmed.chars().count() < MIN_BODY_CHARS {
        None
    } else {
        Some(trimmed.to_string())
    }
}
