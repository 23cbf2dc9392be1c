//! Library emitter.
//!
//! Writes a classified corpus to disk as one directory per category, plus
//! the top-level `INDEX.md`, `manifest.json` and `corpus.json`:
//!
//! ```text
//! <output_dir>/
//! ├── INDEX.md
//! ├── manifest.json
//! ├── corpus.json
//! ├── video/
//! │   ├── thumbnails.md
//! │   └── ...
//! └── misc/
//!     └── ...
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, instrument};

use doclib_shared::{
    CURRENT_SCHEMA_VERSION, Category, CategoryCatalog, CorpusEntry, DocLibError, EmittedFile,
    LibraryManifest, ManifestCategory, Result,
};

use crate::classify;
use crate::pipeline::ProgressReporter;

pub const INDEX_FILE: &str = "INDEX.md";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const CORPUS_FILE: &str = "corpus.json";

/// Shortest path-derived file stem kept before falling back to the title.
const MIN_STEM_LEN: usize = 4;

/// Configuration for writing a library.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Directory the library is written into. Replaced on every run.
    pub output_dir: PathBuf,
    /// Base URL recorded in the manifest and index.
    pub base_url: String,
    /// Display names, descriptions and ordering for categories.
    pub catalog: CategoryCatalog,
}

/// Output from a successful library write.
#[derive(Debug, Clone)]
pub struct LibraryResult {
    pub output_dir: PathBuf,
    /// Number of documents written, not counting the top-level files.
    pub file_count: usize,
    pub manifest: LibraryManifest,
}

/// Write `corpus` into `config.output_dir`.
///
/// Any existing content of the output directory is removed first. Entries
/// without a category are classified on the way.
#[instrument(skip_all, fields(output_dir = %config.output_dir.display(), entries = corpus.len()))]
pub fn write_library(
    config: &LibraryConfig,
    corpus: &[CorpusEntry],
    progress: &dyn ProgressReporter,
) -> Result<LibraryResult> {
    reset_output_dir(&config.output_dir)?;

    let mut namer = FileNamer::default();
    let mut files: BTreeMap<Category, Vec<EmittedFile>> = BTreeMap::new();
    let total = corpus.len();

    for (i, entry) in corpus.iter().enumerate() {
        let category = entry
            .category
            .unwrap_or_else(|| classify::classify_entry(entry));

        let file_name = namer.claim(category, &file_stem(entry));
        let emitted = write_document(&config.output_dir, category, &file_name, entry)?;

        progress.file_written(&format!("{category}/{file_name}"), i + 1, total);
        files.entry(category).or_default().push(emitted);
    }

    let manifest = build_manifest(config, files, total);

    write_atomic(
        &config.output_dir.join(INDEX_FILE),
        &doclib_artifacts::render_index(&manifest),
    )?;
    write_json(&config.output_dir.join(MANIFEST_FILE), &manifest)?;
    write_json(&config.output_dir.join(CORPUS_FILE), &corpus)?;

    info!(
        file_count = total,
        categories = manifest.categories.len(),
        path = %config.output_dir.display(),
        "library written"
    );

    Ok(LibraryResult {
        output_dir: config.output_dir.clone(),
        file_count: total,
        manifest,
    })
}

/// Load a previously written `manifest.json`.
pub fn read_manifest(output_dir: &Path) -> Result<LibraryManifest> {
    let path = output_dir.join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&path).map_err(|e| DocLibError::io(&path, e))?;
    let manifest: LibraryManifest = serde_json::from_str(&content)
        .map_err(|e| DocLibError::validation(format!("invalid {MANIFEST_FILE}: {e}")))?;

    if manifest.schema_version != CURRENT_SCHEMA_VERSION {
        return Err(DocLibError::validation(format!(
            "unsupported schema_version: {} (expected {})",
            manifest.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }

    Ok(manifest)
}

// ---------------------------------------------------------------------------
// File naming
// ---------------------------------------------------------------------------

/// Preferred file stem for an entry, before collision handling.
///
/// The source file stem is used unless it is `index` or `page`, in which case
/// the parent directory name stands in. Anything shorter than four
/// characters falls back to the slugified title.
pub fn file_stem(entry: &CorpusEntry) -> String {
    let mut segments: Vec<&str> = entry.path.split('/').filter(|s| !s.is_empty()).collect();
    let file = segments.pop().unwrap_or_default();
    let stem = file
        .strip_suffix(".mdx")
        .or_else(|| file.strip_suffix(".md"))
        .unwrap_or(file);

    let candidate = if stem == "index" || stem == "page" {
        segments.last().copied().unwrap_or_default()
    } else {
        stem
    };

    if candidate.chars().count() >= MIN_STEM_LEN {
        return candidate.to_string();
    }

    match slugify(&entry.title) {
        slug if slug.is_empty() => "document".to_string(),
        slug => slug,
    }
}

/// Lowercase, with every run of non-alphanumeric characters turned into `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Hands out unique file names per category directory.
///
/// Names are compared case-insensitively so the library also unpacks cleanly
/// on case-insensitive filesystems.
#[derive(Debug, Default)]
struct FileNamer {
    used: HashMap<Category, HashSet<String>>,
}

impl FileNamer {
    fn claim(&mut self, category: Category, stem: &str) -> String {
        let used = self.used.entry(category).or_default();

        let mut name = format!("{stem}.md");
        let mut suffix = 1;
        while used.contains(&name.to_lowercase()) {
            name = format!("{stem}-{suffix}.md");
            suffix += 1;
        }

        used.insert(name.to_lowercase());
        name
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Remove the output directory (if present) and recreate it empty.
fn reset_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| DocLibError::io(dir, e))?;
        debug!(path = %dir.display(), "removed previous output");
    }
    std::fs::create_dir_all(dir).map_err(|e| DocLibError::io(dir, e))
}

fn write_document(
    output_dir: &Path,
    category: Category,
    file_name: &str,
    entry: &CorpusEntry,
) -> Result<EmittedFile> {
    let dir = output_dir.join(category.as_str());
    std::fs::create_dir_all(&dir).map_err(|e| DocLibError::io(&dir, e))?;

    let content = doclib_artifacts::render_document(entry);
    let path = dir.join(file_name);
    std::fs::write(&path, &content).map_err(|e| DocLibError::io(&path, e))?;

    debug!(path = %path.display(), id = %entry.id, "wrote document");

    Ok(EmittedFile {
        file_name: file_name.to_string(),
        entry_id: entry.id.clone(),
        title: entry.title.clone(),
        source_url: entry.source_url.clone(),
        sha256: doclib_artifacts::sha256_hex(&content),
        size_bytes: content.len(),
    })
}

fn build_manifest(
    config: &LibraryConfig,
    mut files: BTreeMap<Category, Vec<EmittedFile>>,
    entry_count: usize,
) -> LibraryManifest {
    let order = config.catalog.order(files.keys().copied());

    let categories = order
        .into_iter()
        .filter_map(|category| {
            let files = files.remove(&category)?;
            Some(ManifestCategory {
                category,
                name: config.catalog.display_name(category),
                description: config.catalog.description(category),
                directory: category.as_str().to_string(),
                file_count: files.len(),
                files,
            })
        })
        .collect();

    LibraryManifest {
        schema_version: CURRENT_SCHEMA_VERSION,
        generated_at: Utc::now(),
        base_url: config.base_url.clone(),
        entry_count,
        categories,
    }
}

/// Write to a dot-prefixed temp file, then rename into place.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| DocLibError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(DocLibError::io(path, e));
    }

    debug!(path = %path.display(), size = content.len(), "wrote file");
    Ok(())
}

/// Write a JSON file (pretty-printed).
fn write_json<T: serde::Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| DocLibError::validation(format!("JSON serialization failed: {e}")))?;
    write_atomic(path, &json)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
