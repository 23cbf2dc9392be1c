//! Rule-based category classifier.
//!
//! Each entry is matched against an ordered rule list; the first rule that
//! matches wins, and entries matching nothing fall into [`Category::Misc`].
//! Rules look at the lowercased path, title and content together, plus the
//! individual path segments.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument};

use doclib_shared::{Category, CorpusEntry};

/// Lowercased text and path segments a rule can look at.
struct Signals {
    haystack: String,
    segments: Vec<String>,
}

impl Signals {
    fn new(path: &str, title: &str, content: &str) -> Self {
        let path = path.replace('\\', "/").to_lowercase();

        let mut segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if let Some(last) = segments.last_mut() {
            if let Some((stem, _ext)) = last.rsplit_once('.') {
                *last = stem.to_string();
            }
        }

        let haystack = format!("{path}\n{}\n{}", content.to_lowercase(), title.to_lowercase());

        Self { haystack, segments }
    }

    fn has_segment(&self, pred: impl Fn(&str) -> bool) -> bool {
        self.segments.iter().any(|s| pred(s))
    }
}

struct Rule {
    category: Category,
    matches: fn(&Signals) -> bool,
}

/// Priority order. The first match wins.
static RULES: [Rule; 8] = [
    Rule {
        category: Category::FrameworksAndIntegrations,
        matches: is_framework,
    },
    Rule {
        category: Category::LiveStreaming,
        matches: is_live,
    },
    Rule {
        category: Category::Security,
        matches: is_security,
    },
    Rule {
        category: Category::Upload,
        matches: is_upload,
    },
    Rule {
        category: Category::DataAndAnalytics,
        matches: is_data,
    },
    Rule {
        category: Category::Video,
        matches: is_video,
    },
    Rule {
        category: Category::Core,
        matches: is_core,
    },
    Rule {
        category: Category::Examples,
        matches: is_example,
    },
];

// Terms match anywhere in the haystack, so `asset_id`, `metadata` and
// `livestreams` all count as mentions.

static LIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"live[ -]?stream|broadcast|rtmp|srt").expect("valid regex")
});

static SECURITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"signed|drm|secure|jwt|playback[ -]restriction").expect("valid regex")
});

static UPLOAD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"upload").expect("valid regex"));

static DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"data|metric|analytics|dashboard|monitor|alert").expect("valid regex")
});

static VIDEO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"playback|video|asset|player|thumbnail|image|watermark|clip|encod|caption|subtitle",
    )
    .expect("valid regex")
});

fn is_framework(s: &Signals) -> bool {
    s.has_segment(|seg| seg == "frameworks" || seg == "integrations")
}

fn is_live(s: &Signals) -> bool {
    s.has_segment(|seg| seg == "live" || seg.starts_with("live-")) || LIVE_RE.is_match(&s.haystack)
}

fn is_security(s: &Signals) -> bool {
    SECURITY_RE.is_match(&s.haystack)
}

fn is_upload(s: &Signals) -> bool {
    UPLOAD_RE.is_match(&s.haystack)
}

fn is_data(s: &Signals) -> bool {
    DATA_RE.is_match(&s.haystack)
}

fn is_video(s: &Signals) -> bool {
    VIDEO_RE.is_match(&s.haystack)
}

fn is_core(s: &Signals) -> bool {
    s.has_segment(|seg| seg == "core") || s.haystack.contains("fundamental")
}

fn is_example(s: &Signals) -> bool {
    s.has_segment(|seg| seg == "examples")
}

/// Classify a document from its path, title and normalized content.
pub fn classify(path: &str, title: &str, content: &str) -> Category {
    let signals = Signals::new(path, title, content);
    RULES
        .iter()
        .find(|rule| (rule.matches)(&signals))
        .map_or(Category::Misc, |rule| rule.category)
}

pub fn classify_entry(entry: &CorpusEntry) -> Category {
    classify(&entry.path, &entry.title, &entry.content)
}

/// Assign a category to every entry in place.
#[instrument(skip_all, fields(entries = entries.len()))]
pub fn classify_corpus(entries: &mut [CorpusEntry]) {
    for entry in entries.iter_mut() {
        let category = classify_entry(entry);
        debug!(path = %entry.path, %category, "classified");
        entry.category = Some(category);
    }

    info!("corpus classified");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
