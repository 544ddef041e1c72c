use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::numbering;

/// `<number><whitespace><rest of line>` anchored at a line start. The
/// whitespace may be a non-breaking space or run onto the following line.
static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([0-9]+(?:\.[0-9]+)*)\s+(.*)$").unwrap());

/// One line-initial section number hit in the assembled text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMatch {
    pub number: String,
    /// Text after the number up to the end of that line, trimmed.
    pub leading_text: String,
    pub match_start: usize,
    pub match_end: usize,
}

/// A retained match plus the text that follows it up to the next retained match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpan<'a> {
    pub matched: SectionMatch,
    /// `[match_end, next match_start)`, untrimmed.
    pub trailing: &'a str,
    /// Exclusive end of the span in the assembled text.
    pub end: usize,
}

/// Every grammar-valid section number in document order, duplicates included.
pub fn find_matches(text: &str) -> Vec<SectionMatch> {
    let mut matches = Vec::new();
    let mut rejected = 0usize;

    for caps in SECTION_RE.captures_iter(text) {
        let (Some(whole), Some(number), Some(rest)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if !numbering::is_valid(number.as_str()) {
            rejected += 1;
            continue;
        }
        matches.push(SectionMatch {
            number: number.as_str().to_string(),
            leading_text: rest.as_str().trim().to_string(),
            match_start: whole.start(),
            match_end: whole.end(),
        });
    }

    debug!(found = matches.len(), rejected, "section number candidates");
    matches
}

/// Keep the first occurrence of each number. Later repeats stop being
/// boundaries, so their text folds into the preceding retained section.
pub fn dedup_first(matches: Vec<SectionMatch>) -> Vec<SectionMatch> {
    let mut seen: HashSet<String> = HashSet::new();
    let before = matches.len();
    let unique: Vec<SectionMatch> = matches
        .into_iter()
        .filter(|m| seen.insert(m.number.clone()))
        .collect();
    if unique.len() < before {
        debug!(absorbed = before - unique.len(), "duplicate section numbers");
    }
    unique
}

/// Slice the text between consecutive retained matches.
pub fn spans(text: &str, matches: Vec<SectionMatch>) -> Vec<SectionSpan<'_>> {
    let starts: Vec<usize> = matches.iter().skip(1).map(|m| m.match_start).collect();
    matches
        .into_iter()
        .enumerate()
        .map(|(i, m)| {
            let end = starts.get(i).copied().unwrap_or(text.len());
            let trailing = text.get(m.match_end..end).unwrap_or("");
            SectionSpan { matched: m, trailing, end }
        })
        .collect()
}
