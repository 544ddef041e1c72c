//! Title vs. body decision for the text that shares a line with a section number.
//!
//! Short labels ("Permitted Uses", "DEFINITIONS") are titles; anything that reads
//! like regulatory prose opens the body. The decision is an ordered chain of
//! lexical rules where the first rule with an opinion wins.

use std::sync::LazyLock;

use regex::Regex;

const MAX_TITLE_CHARS: usize = 60;
const MAX_TITLE_WORDS: usize = 6;
const REGULATORY_WORD_LIMIT: usize = 3;
const UPPERCASE_WORD_LIMIT: usize = 5;
const TITLE_CASE_WORD_LIMIT: usize = 5;
const SHORT_LABEL_WORD_LIMIT: usize = 3;

const CONNECTORS: &[&str] = &["and", "or", "of", "the", "in", "for", "to", "with", "a", "an", "by", "on"];
const VERBS: &[&str] = &[
    "is", "are", "was", "were", "be", "been", "being", "has", "have", "had", "do", "does", "did",
    "will", "shall", "may", "can", "must", "should",
];

static MEASUREMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*m[²2]|\d+\s*%|\d+\.\d+\s*m\b").unwrap());
static SECTION_REF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)section\s+\d").unwrap());
static REGULATORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(permitted|required|allowed|prohibited|must|shall|may not)\b").unwrap()
});

/// Sentence openers that mark body prose.
static BODY_OPENERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^a\s+\w+\s+\w+",
        r"^the\s+\w+\s+(is|are|must|may|will|shall|can|should|of)\b",
        r"^for\s+(the|a|an|all|any|each|multiple|every)\b",
        r"^if\s+",
        r"^where\s+",
        r"^when\s+",
        r"^unless\s+",
        r"^except\s+",
        r"^despite\s+",
        r"^no\s+\w+\s+(may|can|shall|must|is|are)\b",
        r"^all\s+\w+\s+(are|must|shall|may|is)\b",
        r"^any\s+\w+\s+(that|which|is|are|must|may)\b",
        r"^on\s+a\s+site\b",
        r"^\w+\s+buildings?\s+(customarily|that|which|are|is|must|may)\b",
        r"^\w+\s+dwelling\b",
        r"^\w+\s+house\b",
        r"^\w+\s+units?\b",
        r"^minimum\s+",
        r"^maximum\s+",
        r"^(is|are|must|may|shall|will|can)\s+",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
    Continue,
}

/// The leading text, pre-split once for every rule.
pub struct Candidate<'a> {
    text: &'a str,
    words: Vec<&'a str>,
}

impl<'a> Candidate<'a> {
    pub fn new(text: &'a str) -> Self {
        let text = text.trim();
        Candidate {
            text,
            words: text.split_whitespace().collect(),
        }
    }

    fn word_count(&self) -> usize {
        self.words.len()
    }
}

pub type Rule = fn(&Candidate) -> Verdict;

/// Evaluated top to bottom; the order is part of the behavior.
pub const RULES: &[(&str, Rule)] = &[
    ("too_long", too_long),
    ("trailing_punctuation", trailing_punctuation),
    ("parenthesis", parenthesis),
    ("measurement", measurement),
    ("section_reference", section_reference),
    ("body_opener", body_opener),
    ("regulatory_phrase", regulatory_phrase),
    ("uppercase_label", uppercase_label),
    ("title_case", title_case),
    ("short_capitalized", short_capitalized),
];

pub fn is_title(leading_text: &str) -> bool {
    let candidate = Candidate::new(leading_text);
    if candidate.text.is_empty() {
        return false;
    }
    for (_, rule) in RULES {
        match rule(&candidate) {
            Verdict::Accept => return true,
            Verdict::Reject => return false,
            Verdict::Continue => {}
        }
    }
    false
}

fn reject_if(cond: bool) -> Verdict {
    if cond {
        Verdict::Reject
    } else {
        Verdict::Continue
    }
}

fn accept_if(cond: bool) -> Verdict {
    if cond {
        Verdict::Accept
    } else {
        Verdict::Continue
    }
}

fn too_long(c: &Candidate) -> Verdict {
    reject_if(c.text.chars().count() > MAX_TITLE_CHARS || c.word_count() > MAX_TITLE_WORDS)
}

fn trailing_punctuation(c: &Candidate) -> Verdict {
    reject_if(c.text.ends_with([':', '.', ',', ';']))
}

fn parenthesis(c: &Candidate) -> Verdict {
    reject_if(c.text.contains(['(', ')']))
}

fn measurement(c: &Candidate) -> Verdict {
    reject_if(MEASUREMENT_RE.is_match(c.text))
}

fn section_reference(c: &Candidate) -> Verdict {
    reject_if(SECTION_REF_RE.is_match(c.text))
}

fn body_opener(c: &Candidate) -> Verdict {
    reject_if(BODY_OPENERS.iter().any(|re| re.is_match(c.text)))
}

/// Short regulatory phrases ("Permitted Uses") fall through to the title checks.
fn regulatory_phrase(c: &Candidate) -> Verdict {
    reject_if(REGULATORY_RE.is_match(c.text) && c.word_count() > REGULATORY_WORD_LIMIT)
}

fn uppercase_label(c: &Candidate) -> Verdict {
    accept_if(
        is_all_caps(c.text)
            && c.word_count() <= UPPERCASE_WORD_LIMIT
            && !c.text.chars().any(|ch| ch.is_ascii_digit()),
    )
}

fn title_case(c: &Candidate) -> Verdict {
    accept_if(
        c.word_count() <= TITLE_CASE_WORD_LIMIT
            && c.words.iter().all(|w| starts_upper(w) || is_connector(w)),
    )
}

fn short_capitalized(c: &Candidate) -> Verdict {
    accept_if(
        c.word_count() <= SHORT_LABEL_WORD_LIMIT
            && c.words.iter().all(|w| !starts_alphabetic(w) || starts_upper(w))
            && !c.words.iter().any(|w| VERBS.contains(&w.to_lowercase().as_str())),
    )
}

/// At least one cased letter and no lowercase ones.
fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

fn starts_upper(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn starts_alphabetic(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_alphabetic)
}

fn is_connector(word: &str) -> bool {
    CONNECTORS.contains(&word.to_lowercase().as_str())
}
