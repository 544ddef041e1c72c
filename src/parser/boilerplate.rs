use std::collections::{HashMap, HashSet};

use tracing::debug;

const EDGE_LINES: usize = 5;
const MAX_LINE_CHARS: usize = 100;

/// Lines that repeat across pages (running headers and footers).
///
/// Built once from every raw page of a document and then only read, so it is
/// computed before any page gets cleaned.
#[derive(Debug, Clone, Default)]
pub struct Boilerplate {
    lines: HashSet<String>,
}

impl Boilerplate {
    /// Sample the first and last five lines of each page (every line when the
    /// page has ten or fewer) and keep those found on at least
    /// `max(2, pages / 3)` pages.
    pub fn detect<S: AsRef<str>>(pages: &[S]) -> Self {
        let mut page_counts: HashMap<&str, usize> = HashMap::new();

        for page in pages {
            let lines: Vec<&str> = page.as_ref().split('\n').collect();
            let sampled: Vec<&str> = if lines.len() > EDGE_LINES * 2 {
                lines[..EDGE_LINES]
                    .iter()
                    .chain(&lines[lines.len() - EDGE_LINES..])
                    .copied()
                    .collect()
            } else {
                lines
            };

            let on_page: HashSet<&str> = sampled
                .into_iter()
                .map(str::trim)
                .filter(|l| !l.is_empty() && l.chars().count() < MAX_LINE_CHARS)
                .collect();

            for line in on_page {
                *page_counts.entry(line).or_insert(0) += 1;
            }
        }

        let threshold = threshold(pages.len());
        let lines: HashSet<String> = page_counts
            .into_iter()
            .filter(|(_, count)| *count >= threshold)
            .map(|(line, _)| line.to_string())
            .collect();

        debug!(pages = pages.len(), threshold, found = lines.len(), "boilerplate detection");
        Boilerplate { lines }
    }

    pub fn contains(&self, trimmed_line: &str) -> bool {
        self.lines.contains(trimmed_line)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn threshold(page_count: usize) -> usize {
    (page_count / 3).max(2)
}
