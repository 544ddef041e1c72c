use std::time::Duration;

use crate::parser::sections::Section;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SectionStats {
    pub total: usize,
    pub top_level: usize,
    pub with_title: usize,
    pub with_body: usize,
    pub max_depth: usize,
    pub first_page: Option<usize>,
    pub last_page: Option<usize>,
}

pub fn section_stats(sections: &[Section]) -> SectionStats {
    SectionStats {
        total: sections.len(),
        top_level: sections.iter().filter(|s| s.parent_section.is_empty()).count(),
        with_title: sections.iter().filter(|s| s.section_title.is_some()).count(),
        with_body: sections.iter().filter(|s| s.section_body_text.is_some()).count(),
        max_depth: sections.iter().map(Section::depth).max().unwrap_or(0),
        first_page: sections.iter().map(|s| s.section_start_page).min(),
        last_page: sections.iter().map(|s| s.section_end_page).max(),
    }
}

pub fn print_stats(stats: &SectionStats) {
    println!("Sections:   {}", stats.total);
    println!("Top level:  {}", stats.top_level);
    println!("With title: {}", stats.with_title);
    println!("With body:  {}", stats.with_body);
    println!("Max depth:  {}", stats.max_depth);
    if let (Some(first), Some(last)) = (stats.first_page, stats.last_page) {
        println!("Pages:      {}-{}", first, last);
    }
}

/// Compact outline table, one row per section, indented by depth.
pub fn print_overview(sections: &[Section], limit: usize) {
    println!(
        "{:<14} | {:<36} | {:>5} | {:>7}",
        "Section", "Title", "Body", "Pages"
    );
    println!("{}", "-".repeat(72));

    for s in sections.iter().take(limit) {
        let indent = "  ".repeat(s.depth().saturating_sub(1));
        let number = truncate(&format!("{}{}", indent, s.section), 14);
        let title = truncate(s.section_title.as_deref().unwrap_or("-"), 36);
        let body = s
            .section_body_text
            .as_ref()
            .map(|b| b.chars().count().to_string())
            .unwrap_or_else(|| "-".into());
        let pages = if s.section_start_page == s.section_end_page {
            s.section_start_page.to_string()
        } else {
            format!("{}-{}", s.section_start_page, s.section_end_page)
        };
        println!("{:<14} | {:<36} | {:>5} | {:>7}", number, title, body, pages);
    }

    if sections.len() > limit {
        println!("... {} more", sections.len() - limit);
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Elapsed time for the end-of-run line: `1.5s`, `2m 5s`, `1h 2m 5s`.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    match (hours, minutes) {
        (0, 0) => format!("{:.1}s", d.as_secs_f64()),
        (0, _) => format!("{}m {}s", minutes, seconds),
        _ => format!("{}h {}m {}s", hours, minutes, seconds),
    }
}
