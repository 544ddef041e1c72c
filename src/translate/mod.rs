//! Plain-language translation of section bodies.
//!
//! The extractor only decides which sections carry body text; this module hands
//! those to a completion backend and always comes back with a record per
//! section, falling back to a fixed placeholder when the backend keeps failing.

pub mod client;

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::error::TranslateError;
use crate::parser::sections::Section;
use crate::settings::Settings;
use client::Completion;

pub const FALLBACK_DESCRIPTION: &str = "Unable to parse section content.";
const NO_TITLE: &str = "No title";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionClause {
    pub condition_english: Option<String>,
    pub requirement_english: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedSection {
    pub id: String,
    pub description: String,
    pub condition_english: Option<String>,
    pub requirement_english: Option<String>,
    pub exception: Option<ExceptionClause>,
}

/// Output envelope: `{ "translated_sections": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationDocument {
    pub translated_sections: Vec<TranslatedSection>,
}

/// What the model is asked to return; every field optional so partial replies parse.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModelReply {
    description: Option<String>,
    condition_english: Option<String>,
    requirement_english: Option<String>,
    exception: Option<ExceptionClause>,
}

impl TranslatedSection {
    pub fn fallback(id: &str) -> Self {
        TranslatedSection {
            id: id.to_string(),
            description: FALLBACK_DESCRIPTION.to_string(),
            condition_english: None,
            requirement_english: None,
            exception: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.description == FALLBACK_DESCRIPTION
    }
}

pub fn build_prompt(number: &str, title: Option<&str>, body: &str, max_body_chars: usize) -> String {
    format!(
        "You translate municipal zoning bylaw sections into plain English.\n\
         Reply with a single JSON object and nothing else, using these keys:\n\
         \"description\": a 2-4 sentence summary a non-lawyer can follow.\n\
         \"condition_english\": when the rule applies, or null for a heading-only section.\n\
         \"requirement_english\": what someone must do to comply, or null if nothing is required.\n\
         \"exception\": {{\"condition_english\": ..., \"requirement_english\": ...}} describing when \
         the requirement changes and what applies instead, or null if there is no exception.\n\n\
         Section ID: {}\n\
         Section Title: {}\n\
         Section Text:\n{}\n",
        number,
        title.unwrap_or(NO_TITLE),
        truncate_chars(body, max_body_chars),
    )
}

/// Strip markdown fences and keep the outermost `{...}` span.
pub fn extract_json(response: &str) -> &str {
    let mut text = response.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    let text = text.trim();

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

pub fn parse_reply(id: &str, response: &str) -> Result<TranslatedSection, TranslateError> {
    let reply: ModelReply = serde_json::from_str(extract_json(response))?;
    let exception = reply.exception.filter(|e| {
        has_text(e.condition_english.as_deref()) || has_text(e.requirement_english.as_deref())
    });
    Ok(TranslatedSection {
        id: id.to_string(),
        description: reply.description.unwrap_or_default(),
        condition_english: reply.condition_english,
        requirement_english: reply.requirement_english,
        exception,
    })
}

/// Ask the backend up to `max_retries` times; never fails.
pub async fn translate_section<C: Completion>(
    client: &C,
    settings: &Settings,
    section: &Section,
) -> TranslatedSection {
    let id = section.section.as_str();
    let body = section.section_body_text.as_deref().unwrap_or_default();
    let prompt = build_prompt(id, section.section_title.as_deref(), body, settings.max_body_chars);
    let attempts = settings.max_retries.max(1);

    for attempt in 1..=attempts {
        let result = match client.complete(&prompt).await {
            Ok(text) => parse_reply(id, &text),
            Err(e) => Err(e),
        };

        match result {
            Ok(translated) => return translated,
            Err(e) if !e.is_transient() => {
                warn!("Section {}: {}", id, e);
                break;
            }
            Err(e) => {
                warn!("Section {} attempt {}/{} failed: {}", id, attempt, attempts, e);
                if attempt < attempts {
                    let delay = Duration::from_millis(settings.retry_delay_ms * u64::from(attempt));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    TranslatedSection::fallback(id)
}

/// Translate every section that has body text, keeping input order.
pub async fn translate_all<C>(client: Arc<C>, settings: &Settings, sections: &[Section]) -> TranslationDocument
where
    C: Completion + 'static,
{
    let with_body: Vec<Section> = sections
        .iter()
        .filter(|s| s.section_body_text.is_some())
        .cloned()
        .collect();
    info!(
        "Translating {} of {} sections (concurrency {})",
        with_body.len(),
        sections.len(),
        settings.concurrency
    );

    let pb = ProgressBar::new(with_body.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
    let mut handles = Vec::with_capacity(with_body.len());

    for section in with_body {
        let client = Arc::clone(&client);
        let sem = Arc::clone(&semaphore);
        let settings = settings.clone();
        let pb = pb.clone();
        let id = section.section.clone();

        let handle = tokio::spawn(async move {
            let _permit = sem.acquire_owned().await.ok();
            let translated = translate_section(client.as_ref(), &settings, &section).await;
            pb.set_message(section.section.clone());
            pb.inc(1);
            translated
        });
        handles.push((id, handle));
    }

    let mut translated_sections = Vec::with_capacity(handles.len());
    for (id, handle) in handles {
        match handle.await {
            Ok(t) => translated_sections.push(t),
            Err(e) => {
                warn!("Translation task for section {} died: {}", id, e);
                translated_sections.push(TranslatedSection::fallback(&id));
            }
        }
    }
    pb.finish_and_clear();

    let fallbacks = translated_sections.iter().filter(|t| t.is_fallback()).count();
    info!(
        "Translated {} sections ({} fell back)",
        translated_sections.len(),
        fallbacks
    );
    TranslationDocument { translated_sections }
}

fn has_text(s: Option<&str>) -> bool {
    s.is_some_and(|s| !s.trim().is_empty())
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<VecDeque<Result<String, TranslateError>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, TranslateError>>) -> Self {
            Scripted {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Completion for Scripted {
        async fn complete(&self, _prompt: &str) -> Result<String, TranslateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(TranslateError::EmptyResponse))
        }
    }

    fn fast_settings() -> Settings {
        Settings {
            retry_delay_ms: 0,
            ..Settings::default()
        }
    }

    fn section(number: &str, title: Option<&str>, body: Option<&str>) -> Section {
        Section {
            parent_section: crate::parser::numbering::parent(number),
            section: number.to_string(),
            section_title: title.map(str::to_string),
            section_body_text: body.map(str::to_string),
            section_start_page: 1,
            section_end_page: 1,
        }
    }

    const GOOD: &str = r#"{"description": "Sets height limits.", "condition_english": "Any new building.", "requirement_english": "Stay under 10 m.", "exception": null}"#;

    #[test]
    fn strips_fences() {
        assert_eq!(extract_json("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(extract_json("```\n{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(extract_json("Sure! {\"a\": {\"b\": 2}} hope that helps"), "{\"a\": {\"b\": 2}}");
        assert_eq!(extract_json("no json here"), "no json here");
    }

    #[test]
    fn parses_reply() {
        let t = parse_reply("2.2.1", GOOD).unwrap();
        assert_eq!(t.id, "2.2.1");
        assert_eq!(t.description, "Sets height limits.");
        assert_eq!(t.requirement_english.as_deref(), Some("Stay under 10 m."));
        assert_eq!(t.exception, None);
    }

    #[test]
    fn empty_exception_is_dropped() {
        let raw = r#"{"description": "d", "exception": {"condition_english": "", "requirement_english": null}}"#;
        assert_eq!(parse_reply("1", raw).unwrap().exception, None);

        let raw = r#"{"description": "d", "exception": {"condition_english": "Corner lots", "requirement_english": null}}"#;
        let e = parse_reply("1", raw).unwrap().exception.unwrap();
        assert_eq!(e.condition_english.as_deref(), Some("Corner lots"));
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let t = parse_reply("1", "{}").unwrap();
        assert_eq!(t.description, "");
        assert!(!t.is_fallback());
    }

    #[test]
    fn malformed_reply_is_parse_error() {
        assert!(matches!(parse_reply("1", "{ nope"), Err(TranslateError::Parse(_))));
    }

    #[test]
    fn prompt_truncates_body_on_char_boundary() {
        let body = "é".repeat(20);
        let prompt = build_prompt("3", None, &body, 5);
        assert!(prompt.contains("Section Title: No title"));
        assert!(prompt.contains(&format!("Section Text:\n{}\n", "é".repeat(5))));
        assert!(!prompt.contains(&"é".repeat(6)));
    }

    #[test]
    fn prompt_uses_title() {
        let prompt = build_prompt("2.1", Some("Permitted Uses"), "body", 100);
        assert!(prompt.contains("Section ID: 2.1"));
        assert!(prompt.contains("Section Title: Permitted Uses"));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let client = Scripted::new(vec![
            Err(TranslateError::EmptyResponse),
            Ok("not json at all".to_string()),
            Ok(GOOD.to_string()),
        ]);
        let s = section("2.2.1", None, Some("No building shall exceed 10 m in height."));
        let t = translate_section(&client, &fast_settings(), &s).await;
        assert_eq!(client.calls(), 3);
        assert_eq!(t.description, "Sets height limits.");
    }

    #[tokio::test]
    async fn falls_back_after_exhausting_retries() {
        let client = Scripted::new(vec![
            Ok("garbage".to_string()),
            Ok("garbage".to_string()),
            Ok("garbage".to_string()),
            Ok(GOOD.to_string()),
        ]);
        let s = section("4", Some("Uses"), Some("Body text here."));
        let t = translate_section(&client, &fast_settings(), &s).await;
        assert_eq!(client.calls(), 3);
        assert_eq!(t, TranslatedSection::fallback("4"));
        assert!(t.condition_english.is_none() && t.requirement_english.is_none() && t.exception.is_none());
    }

    #[tokio::test]
    async fn missing_key_is_not_retried() {
        let client = Scripted::new(vec![Err(TranslateError::MissingApiKey), Ok(GOOD.to_string())]);
        let s = section("4", None, Some("Body text here."));
        let t = translate_section(&client, &fast_settings(), &s).await;
        assert_eq!(client.calls(), 1);
        assert!(t.is_fallback());
    }

    #[tokio::test]
    async fn translate_all_skips_bodiless_and_keeps_order() {
        let replies = (0..3).map(|_| Ok(GOOD.to_string())).collect();
        let client = Arc::new(Scripted::new(replies));
        let sections = vec![
            section("1", Some("ADMINISTRATION"), None),
            section("1.1", Some("Purpose"), Some("Regulates land use.")),
            section("1.2", Some("Definitions"), Some("Terms used here.")),
            section("2", Some("ZONES"), None),
            section("2.1", None, Some("Every lot is in one zone.")),
        ];
        let settings = Settings {
            concurrency: 2,
            ..fast_settings()
        };
        let out = translate_all(Arc::clone(&client), &settings, &sections).await;
        let ids: Vec<&str> = out.translated_sections.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1.1", "1.2", "2.1"]);
        assert_eq!(client.calls(), 3);
    }

    /// Fails every prompt that mentions `marker`, answers the rest.
    struct FailsOn {
        marker: &'static str,
    }

    impl Completion for FailsOn {
        async fn complete(&self, prompt: &str) -> Result<String, TranslateError> {
            if prompt.contains(self.marker) {
                Ok("garbage".to_string())
            } else {
                Ok(GOOD.to_string())
            }
        }
    }

    #[tokio::test]
    async fn one_failing_section_does_not_stop_the_rest() {
        let client = Arc::new(FailsOn { marker: "First body" });
        let sections = vec![
            section("1", None, Some("First body.")),
            section("2", None, Some("Second body.")),
        ];
        let out = translate_all(client, &fast_settings(), &sections).await;
        assert_eq!(out.translated_sections.len(), 2);
        assert!(out.translated_sections[0].is_fallback());
        assert_eq!(out.translated_sections[1].description, "Sets height limits.");
    }
}
