const PAGE_SEPARATOR: &str = "\n\n";

/// Byte range `[start, end)` one page occupies in the assembled text.
/// The separator after a page is not part of its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBoundary {
    pub page_number: usize,
    pub start: usize,
    pub end: usize,
}

/// Cleaned pages stitched into one buffer, addressable back to page numbers.
#[derive(Debug, Clone, Default)]
pub struct Document {
    text: String,
    boundaries: Vec<PageBoundary>,
}

impl Document {
    /// Pages are 1-based in input order; each one is followed by a blank line.
    pub fn assemble<S: AsRef<str>>(pages: &[S]) -> Self {
        let total: usize = pages.iter().map(|p| p.as_ref().len() + PAGE_SEPARATOR.len()).sum();
        let mut text = String::with_capacity(total);
        let mut boundaries = Vec::with_capacity(pages.len());

        for (i, page) in pages.iter().enumerate() {
            let start = text.len();
            text.push_str(page.as_ref());
            boundaries.push(PageBoundary {
                page_number: i + 1,
                start,
                end: text.len(),
            });
            text.push_str(PAGE_SEPARATOR);
        }

        Document { text, boundaries }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn boundaries(&self) -> &[PageBoundary] {
        &self.boundaries
    }

    /// Page that owns byte offset `pos`.
    ///
    /// Separator bytes and empty pages belong to the closest non-empty page
    /// before them, and anything at or past the end of the text maps the same
    /// way. Never fails: an empty document answers page 1.
    pub fn page_for_offset(&self, pos: usize) -> usize {
        let idx = self.boundaries.partition_point(|b| b.start <= pos);
        let before = &self.boundaries[..idx];
        before
            .iter()
            .rev()
            .find(|b| b.start < b.end)
            .or_else(|| before.last())
            .or_else(|| self.boundaries.first())
            .map_or(1, |b| b.page_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_exclude_separator() {
        let doc = Document::assemble(&["abc", "de"]);
        assert_eq!(doc.text(), "abc\n\nde\n\n");
        assert_eq!(
            doc.boundaries(),
            &[
                PageBoundary { page_number: 1, start: 0, end: 3 },
                PageBoundary { page_number: 2, start: 5, end: 7 },
            ]
        );
    }

    #[test]
    fn boundaries_ordered_and_non_overlapping() {
        let doc = Document::assemble(&["one", "", "three", "four four"]);
        for pair in doc.boundaries().windows(2) {
            assert!(pair[0].end <= pair[1].start);
            assert_eq!(pair[0].page_number + 1, pair[1].page_number);
        }
    }

    #[test]
    fn empty_page_gets_empty_range() {
        let doc = Document::assemble(&["abc", "", "xyz"]);
        let b = doc.boundaries()[1];
        assert_eq!(b.start, b.end);
        assert_eq!(doc.page_for_offset(b.start), 1);
        assert_eq!(doc.page_for_offset(doc.boundaries()[2].start), 3);
    }

    #[test]
    fn leading_empty_pages_map_to_themselves() {
        let doc = Document::assemble(&["", "", "abc"]);
        assert_eq!(doc.page_for_offset(0), 1);
        assert_eq!(doc.page_for_offset(2), 2);
        assert_eq!(doc.page_for_offset(4), 3);
    }

    #[test]
    fn trailing_empty_page_not_used_past_the_end() {
        let doc = Document::assemble(&["abc", ""]);
        assert_eq!(doc.page_for_offset(doc.text().len() - 1), 1);
    }

    #[test]
    fn offsets_map_to_pages() {
        let doc = Document::assemble(&["abc", "de", "fgh"]);
        assert_eq!(doc.page_for_offset(0), 1);
        assert_eq!(doc.page_for_offset(2), 1);
        assert_eq!(doc.page_for_offset(5), 2);
        assert_eq!(doc.page_for_offset(6), 2);
        assert_eq!(doc.page_for_offset(9), 3);
    }

    #[test]
    fn separator_belongs_to_preceding_page() {
        let doc = Document::assemble(&["abc", "de"]);
        assert_eq!(doc.page_for_offset(3), 1);
        assert_eq!(doc.page_for_offset(4), 1);
    }

    #[test]
    fn past_the_end_falls_back_to_last_page() {
        let doc = Document::assemble(&["abc", "de"]);
        assert_eq!(doc.page_for_offset(8), 2);
        assert_eq!(doc.page_for_offset(10_000), 2);
    }

    #[test]
    fn empty_document_never_fails() {
        let doc = Document::assemble::<&str>(&[]);
        assert_eq!(doc.text(), "");
        assert_eq!(doc.page_for_offset(0), 1);
    }
}
