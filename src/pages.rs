use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

const FORM_FEED: char = '\x0c';

#[derive(Deserialize)]
#[serde(untagged)]
enum PagesJson {
    List(Vec<String>),
    Wrapped { pages: Vec<String> },
}

/// Load per-page text produced by an upstream PDF-to-text step.
///
/// `.json` files hold either `["page one", ...]` or `{"pages": [...]}`; anything
/// else is plain text with pages separated by form feeds (pdftotext output).
pub fn load_pages(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pages from {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let pages = if is_json {
        parse_json_pages(&raw).with_context(|| format!("Invalid page JSON in {}", path.display()))?
    } else {
        split_form_feeds(&raw)
    };

    info!("Loaded {} pages from {}", pages.len(), path.display());
    Ok(pages)
}

fn parse_json_pages(raw: &str) -> Result<Vec<String>> {
    let pages = match serde_json::from_str::<PagesJson>(raw)? {
        PagesJson::List(pages) => pages,
        PagesJson::Wrapped { pages } => pages,
    };
    Ok(pages.iter().map(|p| normalize_newlines(p)).collect())
}

fn split_form_feeds(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw.split(FORM_FEED).map(normalize_newlines).collect();
    // pdftotext ends every page with a form feed
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

fn normalize_newlines(page: &str) -> String {
    page.replace("\r\n", "\n")
}
