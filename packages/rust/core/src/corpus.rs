//! Corpus builder.
//!
//! Turns the files under a docs root into [`CorpusEntry`] values: frontmatter
//! is parsed, the body normalized, and each entry gets a slug-derived id and
//! a public source URL. The finished corpus is ordered by frontmatter `order`
//! hints, falling back to path order.

use std::cmp::Ordering;
use std::path::Path;

use tracing::{debug, info, instrument};
use url::Url;

use doclib_shared::{CorpusEntry, DocLibError, Frontmatter, FrontmatterValue, Result};

use crate::pipeline::ProgressReporter;

/// Read, parse and order every documentation file under `docs_dir`.
///
/// Files are numbered in byte-wise path order before parsing, so ids are
/// reproducible for an unchanged file set.
#[instrument(skip_all, fields(docs_dir = %docs_dir.display()))]
pub fn build_corpus(
    docs_dir: &Path,
    base_url: &Url,
    progress: &dyn ProgressReporter,
) -> Result<Vec<CorpusEntry>> {
    let root = std::path::absolute(docs_dir).map_err(|e| DocLibError::io(docs_dir, e))?;

    let mut files = doclib_discovery::discover_files(&root)?;
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    let total = files.len();
    let mut corpus = Vec::with_capacity(total);

    for (index, file) in files.iter().enumerate() {
        let bytes = std::fs::read(file).map_err(|e| DocLibError::io(file, e))?;
        let raw = String::from_utf8_lossy(&bytes);
        let relative = relative_path(&root, file);

        let entry = build_entry(index, &relative, &raw, base_url)?;
        debug!(id = %entry.id, path = %entry.path, "entry built");
        progress.file_parsed(&entry.path, index + 1, total);

        corpus.push(entry);
    }

    sort_corpus(&mut corpus);

    info!(entries = corpus.len(), "corpus built");
    Ok(corpus)
}

/// Build a single entry from its 0-based discovery index, relative path and raw text.
pub fn build_entry(
    index: usize,
    relative: &str,
    raw: &str,
    base_url: &Url,
) -> Result<CorpusEntry> {
    let document = doclib_markdown::process(raw);
    let slug = to_slug(relative);
    let source_url = resolve_source_url(base_url, &slug)?;

    let id = if slug.is_empty() {
        format!("{}-root", index + 1)
    } else {
        format!("{}-{slug}", index + 1)
    };

    Ok(CorpusEntry {
        id,
        title: entry_title(&document.frontmatter, &slug, relative),
        path: relative.to_string(),
        source_url,
        order: entry_order(&document.frontmatter),
        content: document.content,
        category: None,
    })
}

/// Derive the URL slug for a path relative to the docs root.
///
/// - `guides/upload/page.mdx` → `guides/upload/`
/// - `guides/index.mdx` → `guides/`
/// - `guides/upload.md` → `guides/upload`
pub fn to_slug(relative: &str) -> String {
    let path = relative.replace('\\', "/");

    let (dir, file) = match path.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, path.as_str()),
    };

    let slug = match (dir, strip_doc_extension(file)) {
        (Some(dir), Some("page")) => format!("{dir}/"),
        (Some(dir), Some("index")) => format!("{dir}/"),
        (None, Some("index")) => String::new(),
        (Some(dir), Some(stem)) => format!("{dir}/{stem}"),
        (None, Some(stem)) => stem.to_string(),
        (_, None) => path.clone(),
    };

    slug.trim_start_matches('/').to_string()
}

/// Resolve a slug against the base URL.
pub fn resolve_source_url(base_url: &Url, slug: &str) -> Result<String> {
    base_url
        .join(slug)
        .map(|url| url.to_string())
        .map_err(|e| {
            DocLibError::validation(format!("cannot resolve '{slug}' against {base_url}: {e}"))
        })
}

/// Frontmatter `title`, else the slug, else the relative path.
fn entry_title(data: &Frontmatter, slug: &str, relative: &str) -> String {
    match data.get("title").map(FrontmatterValue::to_string) {
        Some(title) if !title.is_empty() => title,
        _ if !slug.is_empty() => slug.to_string(),
        _ => relative.to_string(),
    }
}

/// Numeric `order` from frontmatter. Strings are ignored.
fn entry_order(data: &Frontmatter) -> Option<f64> {
    data.get("order").and_then(FrontmatterValue::as_number)
}

/// `/`-separated path of `file` relative to `root`.
fn relative_path(root: &Path, file: &Path) -> String {
    file.strip_prefix(root)
        .unwrap_or(file)
        .to_string_lossy()
        .replace('\\', "/")
}

fn strip_doc_extension(file: &str) -> Option<&str> {
    file.strip_suffix(".mdx").or_else(|| file.strip_suffix(".md"))
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Compare by `order` when both entries carry different values, else by path.
pub fn compare_entries(a: &CorpusEntry, b: &CorpusEntry) -> Ordering {
    if let (Some(x), Some(y)) = (a.order, b.order) {
        if x != y {
            return x.total_cmp(&y);
        }
    }
    a.path.cmp(&b.path)
}

/// Stable in-place sort using [`compare_entries`].
///
/// `compare_entries` is not transitive once only some entries carry an
/// `order`, so this uses a plain insertion sort whose result depends only on
/// the input sequence.
pub fn sort_corpus(entries: &mut [CorpusEntry]) {
    for i in 1..entries.len() {
        let mut j = i;
        while j > 0 && compare_entries(&entries[j - 1], &entries[j]) == Ordering::Greater {
            entries.swap(j - 1, j);
            j -= 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentProgress;
    use std::path::PathBuf;

    fn base() -> Url {
        Url::parse("https://docs.example.com/").unwrap()
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("doclib-corpus-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn entry(path: &str, order: Option<f64>) -> CorpusEntry {
        CorpusEntry {
            id: path.into(),
            title: path.into(),
            path: path.into(),
            source_url: String::new(),
            order,
            content: String::new(),
            category: None,
        }
    }

    fn paths(entries: &[CorpusEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn slug_rules() {
        assert_eq!(to_slug("video/thumbnails/page.mdx"), "video/thumbnails/");
        assert_eq!(to_slug("guides/index.mdx"), "guides/");
        assert_eq!(to_slug("index.md"), "");
        assert_eq!(to_slug("guides/upload.md"), "guides/upload");
        assert_eq!(to_slug("page.mdx"), "page");
        assert_eq!(to_slug("guides\\windows\\page.md"), "guides/windows/");
        assert_eq!(to_slug("guides/reindex.mdx"), "guides/reindex");
    }

    #[test]
    fn source_url_resolution() {
        assert_eq!(
            resolve_source_url(&base(), "video/thumbnails/").unwrap(),
            "https://docs.example.com/video/thumbnails/"
        );
        assert_eq!(resolve_source_url(&base(), "").unwrap(), "https://docs.example.com/");

        let nested = Url::parse("https://example.com/docs/").unwrap();
        assert_eq!(
            resolve_source_url(&nested, "guides/upload").unwrap(),
            "https://example.com/docs/guides/upload"
        );
    }

    #[test]
    fn build_entry_from_page_file() {
        let raw = "---\ntitle: Thumbnails\n---\n# Thumbnails\n\nGenerate a thumbnail image.";
        let entry = build_entry(2, "video/thumbnails/page.mdx", raw, &base()).unwrap();

        assert_eq!(entry.id, "3-video/thumbnails/");
        assert_eq!(entry.title, "Thumbnails");
        assert_eq!(entry.path, "video/thumbnails/page.mdx");
        assert_eq!(entry.source_url, "https://docs.example.com/video/thumbnails/");
        assert_eq!(entry.order, None);
        assert_eq!(entry.content, "Thumbnails\n\nGenerate a thumbnail image.");
        assert_eq!(entry.category, None);
    }

    #[test]
    fn root_index_gets_root_id_and_path_title() {
        let entry = build_entry(0, "index.mdx", "Welcome.", &base()).unwrap();
        assert_eq!(entry.id, "1-root");
        assert_eq!(entry.title, "index.mdx");
        assert_eq!(entry.source_url, "https://docs.example.com/");
    }

    #[test]
    fn title_falls_back_to_slug() {
        let entry = build_entry(4, "guides/upload.md", "---\ntitle: \"\"\n---\nBody", &base()).unwrap();
        assert_eq!(entry.title, "guides/upload");
    }

    #[test]
    fn numeric_title_is_rendered() {
        let entry = build_entry(0, "errors/404.md", "---\ntitle: 404\n---\n", &base()).unwrap();
        assert_eq!(entry.title, "404");
    }

    #[test]
    fn order_must_be_numeric() {
        let e = build_entry(0, "a.md", "---\norder: 3\n---\n", &base()).unwrap();
        assert_eq!(e.order, Some(3.0));
        let e = build_entry(0, "a.md", "---\norder: first\n---\n", &base()).unwrap();
        assert_eq!(e.order, None);
    }

    #[test]
    fn zero_order_is_kept_and_sorts_first() {
        let zero = build_entry(0, "z.md", "---\norder: 0\n---\nZero.", &base()).unwrap();
        let five = build_entry(1, "a.md", "---\norder: 5\n---\nFive.", &base()).unwrap();
        assert_eq!(zero.order, Some(0.0));

        let mut entries = vec![five, zero];
        sort_corpus(&mut entries);
        assert_eq!(paths(&entries), vec!["z.md", "a.md"]);
    }

    #[test]
    fn compare_uses_order_only_when_both_differ() {
        assert_eq!(
            compare_entries(&entry("z.md", Some(1.0)), &entry("a.md", Some(2.0))),
            Ordering::Less
        );
        assert_eq!(
            compare_entries(&entry("z.md", Some(1.0)), &entry("a.md", None)),
            Ordering::Greater
        );
        assert_eq!(
            compare_entries(&entry("b.md", Some(5.0)), &entry("a.md", Some(5.0))),
            Ordering::Greater
        );
    }

    #[test]
    fn sort_orders_by_hint_then_path() {
        let mut entries = vec![
            entry("d.md", Some(2.0)),
            entry("c.md", None),
            entry("b.md", Some(1.0)),
            entry("a.md", None),
        ];
        sort_corpus(&mut entries);
        assert_eq!(paths(&entries), vec!["a.md", "b.md", "c.md", "d.md"]);

        let mut entries = vec![
            entry("a.md", Some(3.0)),
            entry("b.md", Some(1.0)),
            entry("c.md", Some(2.0)),
        ];
        sort_corpus(&mut entries);
        assert_eq!(paths(&entries), vec!["b.md", "c.md", "a.md"]);
    }

    #[test]
    fn sort_is_deterministic_for_mixed_hints() {
        let input = vec![
            entry("a.md", Some(2.0)),
            entry("b.md", None),
            entry("c.md", Some(1.0)),
            entry("d.md", None),
        ];

        let mut first = input.clone();
        sort_corpus(&mut first);
        let mut second = input.clone();
        sort_corpus(&mut second);

        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn build_corpus_from_tree() {
        let tmp = temp_dir();
        write(&tmp, "index.mdx", "---\ntitle: Home\n---\nWelcome.");
        write(&tmp, "video/thumbnails/page.mdx", "---\ntitle: Thumbnails\norder: 2\n---\nGenerate a thumbnail image.");
        write(&tmp, "guides/upload.md", "---\ntitle: Upload\norder: 1\n---\nUpload files.");
        write(&tmp, ".hidden/secret.md", "nope");

        let corpus = build_corpus(&tmp, &base(), &SilentProgress).unwrap();

        assert_eq!(
            paths(&corpus),
            vec!["guides/upload.md", "index.mdx", "video/thumbnails/page.mdx"]
        );
        // Ids follow path order, independent of the final ordering
        assert_eq!(corpus[0].id, "1-guides/upload");
        assert_eq!(corpus[1].id, "2-root");
        assert_eq!(corpus[2].id, "3-video/thumbnails/");

        let again = build_corpus(&tmp, &base(), &SilentProgress).unwrap();
        assert_eq!(corpus, again);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
