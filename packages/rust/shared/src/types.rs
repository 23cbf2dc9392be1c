//! Core domain types for doclib corpora and emitted libraries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DocLibError;

/// Current schema version for `manifest.json`.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Frontmatter
// ---------------------------------------------------------------------------

/// A scalar frontmatter value. Numeric-looking values are stored as numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
    Number(f64),
    String(String),
}

impl FrontmatterValue {
    /// The value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// The value as a number, if it was coerced to one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::String(_) => None,
        }
    }
}

impl std::fmt::Display for FrontmatterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Parsed frontmatter block. Key order carries no meaning.
pub type Frontmatter = BTreeMap<String, FrontmatterValue>;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The closed set of topical categories a corpus entry can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    FrameworksAndIntegrations,
    LiveStreaming,
    Security,
    Upload,
    DataAndAnalytics,
    Video,
    Core,
    Examples,
    Misc,
}

impl Category {
    /// Every category, in classifier priority order.
    pub const ALL: [Category; 9] = [
        Self::FrameworksAndIntegrations,
        Self::LiveStreaming,
        Self::Security,
        Self::Upload,
        Self::DataAndAnalytics,
        Self::Video,
        Self::Core,
        Self::Examples,
        Self::Misc,
    ];

    /// Directory name and serialized tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FrameworksAndIntegrations => "frameworks-and-integrations",
            Self::LiveStreaming => "live-streaming",
            Self::Security => "security",
            Self::Upload => "upload",
            Self::DataAndAnalytics => "data-and-analytics",
            Self::Video => "video",
            Self::Core => "core",
            Self::Examples => "examples",
            Self::Misc => "misc",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = DocLibError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DocLibError::validation(format!("unknown category '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// CategoryCatalog
// ---------------------------------------------------------------------------

/// Display metadata for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub category: Category,
    /// Human-readable heading used in the index.
    pub name: String,
    /// One-line description of what the category holds.
    pub description: String,
}

/// Category metadata table handed to the library writer.
///
/// The order of `entries` is the preferred manifest order. Categories that
/// show up in a library but are missing from the table are listed after the
/// known ones, alphabetically.
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    entries: Vec<CategoryInfo>,
}

impl CategoryCatalog {
    pub fn new(entries: Vec<CategoryInfo>) -> Self {
        Self { entries }
    }

    pub fn get(&self, category: Category) -> Option<&CategoryInfo> {
        self.entries.iter().find(|info| info.category == category)
    }

    /// Heading for a category, falling back to a title-cased tag.
    pub fn display_name(&self, category: Category) -> String {
        match self.get(category) {
            Some(info) => info.name.clone(),
            None => title_case(category.as_str()),
        }
    }

    pub fn description(&self, category: Category) -> String {
        self.get(category)
            .map(|info| info.description.clone())
            .unwrap_or_default()
    }

    /// Order the given categories: catalog order first, then unknown ones by tag.
    pub fn order<I>(&self, present: I) -> Vec<Category>
    where
        I: IntoIterator<Item = Category>,
    {
        let mut present: Vec<Category> = present.into_iter().collect();
        present.sort_unstable();
        present.dedup();

        let mut ordered: Vec<Category> = self
            .entries
            .iter()
            .map(|info| info.category)
            .filter(|c| present.contains(c))
            .collect();

        let mut unknown: Vec<Category> = present
            .into_iter()
            .filter(|c| self.get(*c).is_none())
            .collect();
        unknown.sort_by_key(|c| c.as_str());

        ordered.extend(unknown);
        ordered
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        let info = |category, name: &str, description: &str| CategoryInfo {
            category,
            name: name.into(),
            description: description.into(),
        };

        Self::new(vec![
            info(
                Category::Core,
                "Core Concepts",
                "Fundamentals of the platform: accounts, environments, API basics.",
            ),
            info(
                Category::Video,
                "Video",
                "Video on demand: assets, playback, players, thumbnails, captions and encoding.",
            ),
            info(
                Category::LiveStreaming,
                "Live Streaming",
                "Live streams, broadcasting, RTMP and SRT ingest.",
            ),
            info(
                Category::Upload,
                "Upload",
                "Getting media into the platform: direct uploads and ingest from URLs.",
            ),
            info(
                Category::Security,
                "Security",
                "Signed URLs, DRM, JWTs and playback restrictions.",
            ),
            info(
                Category::DataAndAnalytics,
                "Data & Analytics",
                "Viewer metrics, dashboards, monitoring and alerts.",
            ),
            info(
                Category::FrameworksAndIntegrations,
                "Frameworks & Integrations",
                "Guides for web frameworks, SDKs and third-party integrations.",
            ),
            info(
                Category::Examples,
                "Examples",
                "Worked examples and sample applications.",
            ),
            info(
                Category::Misc,
                "Miscellaneous",
                "Everything that did not fit a more specific category.",
            ),
        ])
    }
}

fn title_case(tag: &str) -> String {
    tag.split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    format!("{upper}{}", chars.as_str())
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// CorpusEntry
// ---------------------------------------------------------------------------

/// One parsed and normalized documentation source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    /// `{discovery index + 1}-{slug or "root"}`, unique within a corpus.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Path relative to the corpus root, `/`-separated.
    pub path: String,
    /// Public URL of the page.
    pub source_url: String,
    /// Sort hint from frontmatter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    /// Normalized plain-text body.
    pub content: String,
    /// Assigned by the classifier; `None` until then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

// ---------------------------------------------------------------------------
// LibraryManifest
// ---------------------------------------------------------------------------

/// The `manifest.json` structure written at the root of an emitted library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryManifest {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// When the library was written.
    pub generated_at: DateTime<Utc>,
    /// Base URL every source link was resolved against.
    pub base_url: String,
    /// Total number of emitted documents.
    pub entry_count: usize,
    /// Categories in manifest order.
    pub categories: Vec<ManifestCategory>,
}

/// One category section of the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestCategory {
    pub category: Category,
    pub name: String,
    pub description: String,
    /// Directory relative to the library root.
    pub directory: String,
    pub file_count: usize,
    pub files: Vec<EmittedFile>,
}

/// A single document written into a category directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmittedFile {
    /// File name inside the category directory.
    pub file_name: String,
    pub entry_id: String,
    pub title: String,
    pub source_url: String,
    /// SHA-256 of the rendered document.
    pub sha256: String,
    pub size_bytes: usize,
}
