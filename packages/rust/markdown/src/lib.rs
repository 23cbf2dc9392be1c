//! Frontmatter parsing and Markdown/MDX-to-plain-text normalization.
//!
//! A raw source file goes through [`parse_frontmatter`] to split off its
//! metadata, then through [`normalize`] which strips Markdown and MDX syntax
//! while keeping fenced code blocks verbatim. The result is meant for keyword
//! matching and display; there is no way back to the original Markdown.

mod cleanup;
mod frontmatter;

use tracing::{instrument, trace};

use doclib_shared::Frontmatter;

pub use frontmatter::{ParsedDocument, parse_frontmatter};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A source file after frontmatter parsing and normalization.
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    /// Parsed frontmatter (empty if the file had none).
    pub frontmatter: Frontmatter,
    /// Plain-text body.
    pub content: String,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Strip Markdown/MDX syntax from a document body.
///
/// Passes, in order:
/// 1. Lift fenced code blocks out behind placeholders
/// 2. Drop `import`/`export` lines
/// 3. Drop `{/* ... */}` comments
/// 4. Strip single-line tags
/// 5. Replace links with their label
/// 6. Strip inline code, bold, italic and `__` emphasis markers
/// 7. Strip heading markers
/// 8. Collapse blank-line runs
/// 9. Put the code blocks back
/// 10. Trim every line, then the whole text
pub fn normalize(body: &str) -> String {
    cleanup::run_pipeline(body)
}

/// Parse frontmatter and normalize the rest of a raw source file.
#[instrument(skip_all, fields(raw_len = source.len()))]
pub fn process(source: &str) -> NormalizedDocument {
    let ParsedDocument { data, body } = parse_frontmatter(source);
    let content = normalize(&body);

    trace!(keys = data.len(), content_len = content.len(), "document normalized");

    NormalizedDocument {
        frontmatter: data,
        content,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use doclib_shared::FrontmatterValue;

    #[test]
    fn process_splits_and_normalizes() {
        let source = "---\ntitle: \"Direct Uploads\"\norder: 2\n---\n\nimport X from 'x';\n\n# Direct Uploads\n\nUpload files **directly** from the browser.\n";
        let doc = process(source);

        assert_eq!(
            doc.frontmatter.get("title"),
            Some(&FrontmatterValue::String("Direct Uploads".into()))
        );
        assert_eq!(
            doc.frontmatter.get("order"),
            Some(&FrontmatterValue::Number(2.0))
        );
        assert_eq!(
            doc.content,
            "Direct Uploads\n\nUpload files directly from the browser."
        );
    }

    #[test]
    fn process_without_frontmatter() {
        let doc = process("Just text.");
        assert!(doc.frontmatter.is_empty());
        assert_eq!(doc.content, "Just text.");
    }

    #[test]
    fn normalize_empty_body() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("\n\n   \n"), "");
    }
}
