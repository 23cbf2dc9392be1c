//! Markdown/MDX stripping pipeline.
//!
//! Each pass is a function `&str -> String` applied in sequence. Fenced code
//! blocks are lifted out before the first pass and put back after the last
//! rewrite, so none of the rewrites can touch code.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Run the full stripping pipeline on a document body.
pub(crate) fn run_pipeline(body: &str) -> String {
    let (mut result, code_blocks) = extract_code_blocks(body);

    result = remove_module_lines(&result);
    result = remove_expression_comments(&result);
    result = strip_tags(&result);
    result = unwrap_links(&result);
    result = strip_inline_markers(&result);
    result = strip_heading_markers(&result);
    result = collapse_blank_lines(&result);
    result = restore_code_blocks(&result, &code_blocks);

    trim_lines(&result)
}

// ---------------------------------------------------------------------------
// Pass 1: Lift out fenced code blocks
// ---------------------------------------------------------------------------

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@@CODE_BLOCK_(\d+)@@").expect("valid regex"));

fn placeholder(index: usize) -> String {
    format!("@@CODE_BLOCK_{index}@@")
}

/// Replace every fenced block with a placeholder; return the trimmed blocks by index.
fn extract_code_blocks(md: &str) -> (String, Vec<String>) {
    let mut blocks: Vec<String> = Vec::new();

    let replaced = FENCE_RE
        .replace_all(md, |caps: &Captures| {
            let index = blocks.len();
            blocks.push(caps[0].trim().to_string());
            placeholder(index)
        })
        .to_string();

    (replaced, blocks)
}

// ---------------------------------------------------------------------------
// Pass 2: Drop import/export lines
// ---------------------------------------------------------------------------

/// Remove MDX `import`/`export` statements, one whole line at a time.
fn remove_module_lines(md: &str) -> String {
    md.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !(trimmed.starts_with("import ") || trimmed.starts_with("export "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Pass 3: Drop `{/* ... */}` comments
// ---------------------------------------------------------------------------

fn remove_expression_comments(md: &str) -> String {
    static COMMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)\{\s*/\*.*?\*/\s*\}").expect("valid regex"));

    COMMENT_RE.replace_all(md, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: Strip single-line tags
// ---------------------------------------------------------------------------

/// Remove HTML/JSX tags that open and close on one line, keeping text between them.
fn strip_tags(md: &str) -> String {
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>\n]+>").expect("valid regex"));

    TAG_RE.replace_all(md, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 5: Links become their label
// ---------------------------------------------------------------------------

/// Images keep their alt text.
fn unwrap_links(md: &str) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]+\)").expect("valid regex"));

    LINK_RE.replace_all(md, "$1").to_string()
}

// ---------------------------------------------------------------------------
// Pass 6: Inline code, bold, italic, underscore emphasis
// ---------------------------------------------------------------------------

fn strip_inline_markers(md: &str) -> String {
    static INLINE_CODE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));
    static BOLD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));
    static ITALIC_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));
    static UNDERSCORE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"__([^_]+)__").expect("valid regex"));

    let result = INLINE_CODE_RE.replace_all(md, "$1");
    let result = BOLD_RE.replace_all(&result, "$1");
    let result = ITALIC_RE.replace_all(&result, "$1");
    UNDERSCORE_RE.replace_all(&result, "$1").to_string()
}

// ---------------------------------------------------------------------------
// Pass 7: Heading markers
// ---------------------------------------------------------------------------

/// Remove `#` runs (and the spaces after them) at the start of a line.
fn strip_heading_markers(md: &str) -> String {
    static HEADING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#+[ \t]*").expect("valid regex"));

    HEADING_RE.replace_all(md, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 8: Collapse blank lines
// ---------------------------------------------------------------------------

/// Collapse runs of blank (or whitespace-only) lines into a single blank line.
fn collapse_blank_lines(md: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(md, "\n\n").to_string()
}

// ---------------------------------------------------------------------------
// Pass 9: Put code blocks back
// ---------------------------------------------------------------------------

fn restore_code_blocks(md: &str, blocks: &[String]) -> String {
    PLACEHOLDER_RE
        .replace_all(md, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| blocks.get(index))
                .map(|block| format!("\n{block}\n"))
                .unwrap_or_default()
        })
        .to_string()
}

// ---------------------------------------------------------------------------
// Pass 10: Trim
// ---------------------------------------------------------------------------

fn trim_lines(md: &str) -> String {
    md.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
