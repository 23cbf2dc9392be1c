//! Request options and result types for video analysis.

use serde::{Deserialize, Serialize};

use doclib_shared::DocLibError;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// AI provider the analysis service delegates to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Anthropic,
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = DocLibError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "google" => Ok(Self::Google),
            other => Err(DocLibError::config(format!(
                "unknown provider '{other}' (expected openai, anthropic or google)"
            ))),
        }
    }
}

/// Voice of the generated summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Neutral,
    Playful,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Neutral => "neutral",
            Self::Playful => "playful",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tone {
    type Err = DocLibError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "professional" => Ok(Self::Professional),
            "neutral" => Ok(Self::Neutral),
            "playful" => Ok(Self::Playful),
            other => Err(DocLibError::config(format!(
                "unknown tone '{other}' (expected professional, neutral or playful)"
            ))),
        }
    }
}

/// Scores above which moderation flags an asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModerationThresholds {
    pub sexual: f64,
    pub violence: f64,
}

impl Default for ModerationThresholds {
    fn default() -> Self {
        Self {
            sexual: 0.5,
            violence: 0.5,
        }
    }
}

/// Which analyses to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisSelection {
    pub summarize: bool,
    pub chapters: bool,
    pub moderate: bool,
}

impl AnalysisSelection {
    pub fn all() -> Self {
        Self {
            summarize: true,
            chapters: true,
            moderate: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.summarize || self.chapters || self.moderate)
    }
}

/// Everything needed to analyze one asset.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub asset_id: String,
    pub selection: AnalysisSelection,
    pub provider: Provider,
    pub tone: Tone,
    /// Chapter language code.
    pub language: String,
    pub thresholds: ModerationThresholds,
}

impl AnalysisRequest {
    /// Request with default options and nothing selected.
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            selection: AnalysisSelection::default(),
            provider: Provider::default(),
            tone: Tone::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            thresholds: ModerationThresholds::default(),
        }
    }
}

pub const DEFAULT_LANGUAGE: &str = "en";

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub asset_id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Offset from the start of the asset, in seconds.
    pub start_time: f64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaptersResult {
    pub language_code: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModerationScores {
    pub sexual: f64,
    pub violence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub max_scores: ModerationScores,
    pub exceeds_threshold: bool,
}

/// Results of one `run_analyses` call; unselected analyses stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<ChaptersResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation: Option<ModerationResult>,
}
