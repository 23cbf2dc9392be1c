//! End-to-end `build` pipeline: docs tree → corpus → classify → library.

use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use tracing::{info, instrument};

use doclib_shared::{BuildConfig, Category, CategoryCatalog, DocLibError, Result};

use crate::classify;
use crate::corpus;
use crate::library::{self, LibraryConfig};

/// Result of the `build_library` pipeline.
#[derive(Debug)]
pub struct BuildLibraryResult {
    /// Directory the library was written to.
    pub output_dir: PathBuf,
    /// Number of documents in the corpus.
    pub entry_count: usize,
    /// Documents per category, in manifest order.
    pub categories: Vec<(Category, usize)>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Trait for reporting pipeline progress (implemented by CLI spinner or silent).
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after a source file is parsed and normalized.
    fn file_parsed(&self, path: &str, current: usize, total: usize);
    /// Called after a document is written into the library.
    fn file_written(&self, path: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildLibraryResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_parsed(&self, _path: &str, _current: usize, _total: usize) {}
    fn file_written(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildLibraryResult) {}
}

/// Run the full `build` pipeline.
///
/// 1. Discover and parse every source file under the docs root
/// 2. Order the corpus
/// 3. Classify each entry
/// 4. Write the library, index, manifest and corpus file
#[instrument(skip_all, fields(docs_dir = %config.docs_dir.display(), output_dir = %config.output_dir.display()))]
pub fn build_library(
    config: &BuildConfig,
    catalog: &CategoryCatalog,
    progress: &dyn ProgressReporter,
) -> Result<BuildLibraryResult> {
    let start = Instant::now();
    check_overlap(&config.docs_dir, &config.output_dir)?;

    info!(base_url = %config.base_url, "starting build pipeline");

    // --- Phase 1: Parse ---
    progress.phase("Parsing documentation");
    let mut corpus = corpus::build_corpus(&config.docs_dir, &config.base_url, progress)?;

    // --- Phase 2: Classify ---
    progress.phase("Classifying documents");
    classify::classify_corpus(&mut corpus);

    // --- Phase 3: Write ---
    progress.phase("Writing library");
    let library_config = LibraryConfig {
        output_dir: config.output_dir.clone(),
        base_url: config.base_url.to_string(),
        catalog: catalog.clone(),
    };
    let written = library::write_library(&library_config, &corpus, progress)?;

    let categories = written
        .manifest
        .categories
        .iter()
        .map(|section| (section.category, section.file_count))
        .collect();

    let result = BuildLibraryResult {
        output_dir: written.output_dir,
        entry_count: corpus.len(),
        categories,
        elapsed: start.elapsed(),
    };

    info!(
        entries = result.entry_count,
        categories = result.categories.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "build pipeline complete"
    );

    progress.done(&result);
    Ok(result)
}

/// The output directory is wiped on every run, and its documents are
/// Markdown, so it may neither contain nor sit inside the docs root.
fn check_overlap(docs_dir: &Path, output_dir: &Path) -> Result<()> {
    let docs = resolve_path(docs_dir)?;
    let output = resolve_path(output_dir)?;

    if docs.starts_with(&output) || output.starts_with(&docs) {
        return Err(DocLibError::config(format!(
            "output directory {} overlaps docs directory {}. Set DOCLIB_OUTPUT_DIR (or pass --output-dir) to a separate location.",
            output.display(),
            docs.display()
        )));
    }
    Ok(())
}

/// Canonical form of a path that may not exist yet.
///
/// Existing prefixes are canonicalized (symlinks followed), and `.`/`..` in
/// the missing remainder are resolved lexically.
fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| DocLibError::io(path, e))?;

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => {
                resolved.push(other);
                if resolved.exists() {
                    resolved = std::fs::canonicalize(&resolved)
                        .map_err(|e| DocLibError::io(&resolved, e))?;
                }
            }
        }
    }
    Ok(resolved)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
