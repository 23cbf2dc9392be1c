//! Leading `---` frontmatter block parser.
//!
//! The block is a flat list of `key: value` lines. It is parsed leniently:
//! a missing or malformed block yields empty metadata, and individual lines
//! that do not look like `key: value` are skipped.

use std::sync::LazyLock;

use regex::Regex;

use doclib_shared::{Frontmatter, FrontmatterValue};

/// Marker line, block, and closing marker line including its own line break.
/// Anchored at offset zero.
static FRONTMATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A---\s*[\r\n]((?s:.*?))[\r\n]---[ \t]*(?:\r?\n|\z)").expect("valid regex")
});

/// A document split into its metadata and the text after the block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    /// Parsed `key: value` pairs; empty when there is no block.
    pub data: Frontmatter,
    /// Everything after the closing marker, or the whole input.
    pub body: String,
}

/// Split `source` into frontmatter and body. Never fails.
pub fn parse_frontmatter(source: &str) -> ParsedDocument {
    let Some(caps) = FRONTMATTER_RE.captures(source) else {
        return ParsedDocument {
            data: Frontmatter::new(),
            body: source.to_string(),
        };
    };

    let whole = caps.get(0).map_or(0, |m| m.end());
    let raw_block = caps.get(1).map_or("", |m| m.as_str()).trim();

    let mut data = Frontmatter::new();
    for line in raw_block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let value = strip_matching_quotes(value.trim());
        // Later duplicates overwrite earlier ones.
        data.insert(key.to_string(), coerce_value(value));
    }

    ParsedDocument {
        data,
        body: source[whole..].to_string(),
    }
}

/// Remove one pair of surrounding quotes when both ends use the same quote char.
fn strip_matching_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Numbers become [`FrontmatterValue::Number`]; anything else stays a string.
fn coerce_value(value: &str) -> FrontmatterValue {
    let looks_numeric = !value.is_empty()
        && value.bytes().any(|b| b.is_ascii_digit())
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'));

    if looks_numeric {
        if let Ok(n) = value.parse::<f64>() {
            if n.is_finite() {
                return FrontmatterValue::Number(n);
            }
        }
    }

    FrontmatterValue::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(s: &str) -> FrontmatterValue {
        FrontmatterValue::String(s.into())
    }

    #[test]
    fn parses_block_and_body() {
        let doc = parse_frontmatter("---\ntitle: Thumbnails\norder: 3\n---\n# Heading\n\nBody");
        assert_eq!(doc.data.len(), 2);
        assert_eq!(doc.data["title"], string("Thumbnails"));
        assert_eq!(doc.data["order"], FrontmatterValue::Number(3.0));
        assert_eq!(doc.body, "# Heading\n\nBody");
    }

    #[test]
    fn no_block_returns_original_text() {
        let source = "# Just a doc\n\ntitle: not frontmatter";
        let doc = parse_frontmatter(source);
        assert!(doc.data.is_empty());
        assert_eq!(doc.body, source);
    }

    #[test]
    fn block_not_at_start_is_ignored() {
        let source = "\n---\ntitle: Late\n---\nBody";
        let doc = parse_frontmatter(source);
        assert!(doc.data.is_empty());
        assert_eq!(doc.body, source);
    }

    #[test]
    fn unclosed_block_is_ignored() {
        let source = "---\ntitle: Open\nBody without closing marker";
        let doc = parse_frontmatter(source);
        assert!(doc.data.is_empty());
        assert_eq!(doc.body, source);
    }

    #[test]
    fn colons_inside_values_are_kept() {
        let doc = parse_frontmatter("---\nsource: https://docs.example.com/a:b\n---\n");
        assert_eq!(doc.data["source"], string("https://docs.example.com/a:b"));
    }

    #[test]
    fn matching_quotes_are_stripped() {
        let doc = parse_frontmatter(
            "---\na: \"Double\"\nb: 'Single'\nc: \"Mismatched'\nd: \"Inner \"quotes\" stay\"\n---\n",
        );
        assert_eq!(doc.data["a"], string("Double"));
        assert_eq!(doc.data["b"], string("Single"));
        assert_eq!(doc.data["c"], string("\"Mismatched'"));
        assert_eq!(doc.data["d"], string("Inner \"quotes\" stay"));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let doc = parse_frontmatter("---\ntitle: Ok\njust words\n: no key\n  \nother: fine\n---\nBody");
        assert_eq!(doc.data.len(), 2);
        assert!(doc.data.contains_key("title"));
        assert!(doc.data.contains_key("other"));
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn duplicate_keys_take_last_value() {
        let doc = parse_frontmatter("---\ntitle: First\ntitle: Second\n---\n");
        assert_eq!(doc.data.len(), 1);
        assert_eq!(doc.data["title"], string("Second"));
    }

    #[test]
    fn numeric_coercion() {
        let doc = parse_frontmatter(
            "---\nint: 2\nneg: -4\nfloat: 1.5\nquoted: \"7\"\nversion: 1.2.3\nword: nan\nempty:\n---\n",
        );
        assert_eq!(doc.data["int"], FrontmatterValue::Number(2.0));
        assert_eq!(doc.data["neg"], FrontmatterValue::Number(-4.0));
        assert_eq!(doc.data["float"], FrontmatterValue::Number(1.5));
        // Quoted numbers are still numbers once the quotes are gone
        assert_eq!(doc.data["quoted"], FrontmatterValue::Number(7.0));
        assert_eq!(doc.data["version"], string("1.2.3"));
        assert_eq!(doc.data["word"], string("nan"));
        assert_eq!(doc.data["empty"], string(""));
    }

    #[test]
    fn body_keeps_blank_lines_after_marker() {
        let doc = parse_frontmatter("---\na: 1\n---\n\n    indented\n");
        assert_eq!(doc.data["a"], FrontmatterValue::Number(1.0));
        assert_eq!(doc.body, "\n    indented\n");

        let doc = parse_frontmatter("---\na: 1\n---");
        assert_eq!(doc.data.len(), 1);
        assert_eq!(doc.body, "");
    }

    #[test]
    fn crlf_documents_parse() {
        let doc = parse_frontmatter("---\r\ntitle: Windows\r\n---\r\nBody\r\n");
        assert_eq!(doc.data["title"], string("Windows"));
        assert_eq!(doc.body, "Body\r\n");
    }

    #[test]
    fn n_lines_give_n_entries() {
        let lines: Vec<String> = (0..12).map(|i| format!("key{i}: value {i}")).collect();
        let source = format!("---\n{}\n---\nrest of the document", lines.join("\n"));
        let doc = parse_frontmatter(&source);
        assert_eq!(doc.data.len(), 12);
        assert_eq!(doc.body, "rest of the document");
    }
}
