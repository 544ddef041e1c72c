pub mod assemble;
pub mod boilerplate;
pub mod clean;
pub mod matcher;
pub mod numbering;
pub mod sections;
pub mod title;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use assemble::Document;
use boilerplate::Boilerplate;
use clean::PageCleaner;
use sections::Section;

/// Output envelope: `{ "sections": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionsDocument {
    pub sections: Vec<Section>,
}

/// A source page before and after cleaning.
#[derive(Debug, Clone)]
pub struct Page {
    pub number: usize,
    pub raw_text: String,
    pub cleaned_text: String,
}

/// Detect boilerplate over the whole document, then clean every page against it.
pub fn clean_pages(raw_pages: &[String], district_code: Option<&str>) -> Vec<Page> {
    let boilerplate = Boilerplate::detect(raw_pages);
    if !boilerplate.is_empty() {
        info!(lines = boilerplate.len(), "repeating header/footer lines detected");
    }

    let cleaner = PageCleaner::new(&boilerplate, district_code);
    let pages: Vec<Page> = raw_pages
        .par_iter()
        .enumerate()
        .map(|(i, raw)| Page {
            number: i + 1,
            raw_text: raw.clone(),
            cleaned_text: cleaner.clean(raw),
        })
        .collect();

    for p in &pages {
        debug!(
            page = p.number,
            removed = p.raw_text.len().saturating_sub(p.cleaned_text.len()),
            "page cleaned"
        );
    }
    pages
}

/// Pipeline: boilerplate → clean → assemble → match → classify → order.
pub fn extract(raw_pages: &[String], district_code: Option<&str>) -> SectionsDocument {
    let pages = clean_pages(raw_pages, district_code);
    let cleaned: Vec<&str> = pages.iter().map(|p| p.cleaned_text.as_str()).collect();
    let doc = Document::assemble(&cleaned);
    debug!(
        pages = doc.boundaries().len(),
        chars = doc.text().len(),
        page_chars = doc.boundaries().iter().map(|b| b.end - b.start).sum::<usize>(),
        "document assembled"
    );

    let matches = matcher::dedup_first(matcher::find_matches(doc.text()));
    let mut sections: Vec<Section> = matcher::spans(doc.text(), matches)
        .iter()
        .map(|span| sections::build_section(&doc, span))
        .collect();
    sections::sort_sections(&mut sections);

    info!(pages = pages.len(), sections = sections.len(), "extraction complete");
    SectionsDocument { sections }
}
