//! Text artifacts written into an emitted library.
//!
//! - [`render_document`]: one Markdown file per corpus entry
//! - [`render_index`]: the `INDEX.md` overview of categories and file counts
//! - [`sha256_hex`]: checksums recorded in `manifest.json`

use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use doclib_shared::{CorpusEntry, LibraryManifest};

/// Render a corpus entry as a standalone document.
pub fn render_document(entry: &CorpusEntry) -> String {
    let mut doc = String::with_capacity(entry.content.len() + 128);
    let _ = writeln!(doc, "# {}", entry.title);
    doc.push('\n');
    let _ = writeln!(doc, "Source: {}", entry.source_url);
    doc.push('\n');
    if !entry.content.is_empty() {
        doc.push_str(&entry.content);
        doc.push('\n');
    }
    doc
}

/// Render the library overview (`INDEX.md`).
///
/// Categories appear in manifest order; each lists its heading, directory,
/// description and file count. Search instructions close the document.
pub fn render_index(manifest: &LibraryManifest) -> String {
    let mut md = String::new();

    md.push_str("# Documentation Library\n\n");
    let _ = writeln!(
        md,
        "Generated {} from <{}>. {} documents in {} categories.",
        manifest.generated_at.format("%Y-%m-%d %H:%M UTC"),
        manifest.base_url,
        manifest.entry_count,
        manifest.categories.len(),
    );
    md.push('\n');

    md.push_str("## Categories\n\n");
    if manifest.categories.is_empty() {
        md.push_str("_No documents were found._\n\n");
    }

    for section in &manifest.categories {
        let _ = writeln!(md, "### {} (`{}/`)", section.name, section.directory);
        md.push('\n');
        if !section.description.is_empty() {
            let _ = writeln!(md, "{}", section.description);
            md.push('\n');
        }
        let noun = if section.file_count == 1 { "file" } else { "files" };
        let _ = writeln!(md, "{} {noun}", section.file_count);
        md.push('\n');
    }

    md.push_str("## Searching this library\n\n");
    md.push_str(
        "Every document is plain text with its title on the first line and its \
         public URL on the `Source:` line. Search by keyword across the tree:\n\n",
    );
    md.push_str("```sh\n");
    md.push_str("grep -ril \"signed url\" .\n");
    md.push_str("grep -ril \"thumbnail\" video/\n");
    md.push_str("```\n\n");
    md.push_str(
        "Or rank documents by how many query terms they contain using the corpus \
         file written next to this index:\n\n",
    );
    md.push_str("```sh\n");
    md.push_str("doclib search \"signed playback\" --corpus corpus.json\n");
    md.push_str("```\n");

    md
}

/// Lowercase hex SHA-256 of `content`.
pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
