//! Documentation source discovery.
//!
//! Walks a docs tree and returns every Markdown/MDX file in it. Hidden files
//! and hidden directories (names starting with `.`) are skipped, along with
//! everything beneath them.

use std::path::{Path, PathBuf};

use doclib_shared::{DocLibError, Result};
use tracing::{debug, info, instrument};
use walkdir::{DirEntry, WalkDir};

/// File extensions treated as documentation sources.
const DOC_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// Recursively list documentation files under `root`.
///
/// Returned paths are absolute. Their order is whatever the filesystem
/// yields; callers that need a stable order sort the result.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn discover_files(root: &Path) -> Result<Vec<PathBuf>> {
    let root = std::path::absolute(root).map_err(|e| DocLibError::io(root, e))?;

    let mut files = Vec::new();
    let walker = WalkDir::new(&root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| root.clone(), Path::to_path_buf);
            DocLibError::io(path, e.into())
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        if is_doc_file(entry.path()) {
            debug!(path = %entry.path().display(), "found documentation file");
            files.push(entry.into_path());
        }
    }

    info!(count = files.len(), "documentation files discovered");
    Ok(files)
}

/// Whether `path` has a Markdown or MDX extension.
pub fn is_doc_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOC_EXTENSIONS.contains(&ext))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("doclib-discovery-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "content").unwrap();
    }

    fn relative_sorted(root: &Path, files: &[PathBuf]) -> Vec<String> {
        let mut rel: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        rel.sort();
        rel
    }

    #[test]
    fn finds_markdown_and_mdx_recursively() {
        let tmp = temp_dir();
        touch(&tmp, "index.mdx");
        touch(&tmp, "guides/upload.md");
        touch(&tmp, "video/thumbnails/page.mdx");
        touch(&tmp, "video/notes.txt");
        touch(&tmp, "assets/logo.png");

        let files = discover_files(&tmp).unwrap();
        assert!(files.iter().all(|p| p.is_absolute()));
        assert_eq!(
            relative_sorted(&tmp, &files),
            vec!["guides/upload.md", "index.mdx", "video/thumbnails/page.mdx"]
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn skips_hidden_files_and_directories() {
        let tmp = temp_dir();
        touch(&tmp, "visible.md");
        touch(&tmp, ".draft.md");
        touch(&tmp, ".git/README.md");
        touch(&tmp, "guides/.cache/stale.mdx");

        let files = discover_files(&tmp).unwrap();
        assert_eq!(relative_sorted(&tmp, &files), vec!["visible.md"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn hidden_root_is_still_walked() {
        let tmp = temp_dir();
        let root = tmp.join(".docs");
        touch(&root, "a.md");

        let files = discover_files(&root).unwrap();
        assert_eq!(files.len(), 1);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let err = discover_files(Path::new("/definitely/not/a/docs/dir")).unwrap_err();
        assert!(matches!(err, DocLibError::Io { .. }));
    }

    #[test]
    fn doc_extension_check() {
        assert!(is_doc_file(Path::new("a/b.md")));
        assert!(is_doc_file(Path::new("page.mdx")));
        assert!(!is_doc_file(Path::new("page.MDX.bak")));
        assert!(!is_doc_file(Path::new("README")));
    }
}
