use std::sync::LazyLock;

use regex::Regex;

use super::boilerplate::Boilerplate;

static PAGE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^page\s*\d+").unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());
static DATED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+\s+\d{4}$").unwrap());
static RULE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-_]{3,}$").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Per-document filters applied to every page.
pub struct PageCleaner<'a> {
    boilerplate: &'a Boilerplate,
    district_code: Option<&'a str>,
}

impl<'a> PageCleaner<'a> {
    pub fn new(boilerplate: &'a Boilerplate, district_code: Option<&'a str>) -> Self {
        PageCleaner {
            boilerplate,
            district_code: district_code.map(str::trim).filter(|c| !c.is_empty()),
        }
    }

    /// Drop header/footer lines, collapse blank-line runs, trim the page.
    /// Kept lines are not modified, so cleaning twice changes nothing.
    pub fn clean(&self, raw: &str) -> String {
        let kept: Vec<&str> = raw.split('\n').filter(|line| !self.is_noise(line)).collect();
        let joined = kept.join("\n");
        collapse_blank_runs(&joined).trim().to_string()
    }

    fn is_noise(&self, line: &str) -> bool {
        let stripped = line.trim();
        self.boilerplate.contains(stripped)
            || self.district_code == Some(stripped)
            || is_footer(stripped)
    }
}

fn is_footer(stripped: &str) -> bool {
    PAGE_NUMBER_RE.is_match(stripped)
        || YEAR_RE.is_match(stripped)
        || DATED_RE.is_match(stripped)
        || RULE_RE.is_match(stripped)
        || stripped.starts_with("---")
}

/// Three or more newlines become exactly one blank line.
pub fn collapse_blank_runs(text: &str) -> String {
    BLANK_RUN_RE.replace_all(text, "\n\n").into_owned()
}
