//! Video analysis through a remote AI service.
//!
//! Three operations keyed by an asset id: summary and tags, chapter
//! segmentation, and content moderation. [`AnalysisService`] is the seam;
//! [`HttpAnalysisService`] is the JSON/HTTP implementation and
//! [`run_analyses`] runs a selection of them concurrently.

mod http;
mod types;

use std::future::Future;

use tracing::{info, instrument};

use doclib_shared::{DocLibError, Result};

pub use http::HttpAnalysisService;
pub use types::{
    AnalysisReport, AnalysisRequest, AnalysisSelection, Chapter, ChaptersResult, DEFAULT_LANGUAGE,
    ModerationResult, ModerationScores, ModerationThresholds, Provider, SummaryResult, Tone,
};

/// Moderation is always run against this provider.
pub const MODERATION_PROVIDER: Provider = Provider::OpenAi;

/// Remote analysis operations. No retries; a failed call is returned as is.
pub trait AnalysisService: Send + Sync {
    fn summarize(
        &self,
        asset_id: &str,
        provider: Provider,
        tone: Tone,
    ) -> impl Future<Output = Result<SummaryResult>> + Send;

    fn chapters(
        &self,
        asset_id: &str,
        provider: Provider,
        language: &str,
    ) -> impl Future<Output = Result<ChaptersResult>> + Send;

    fn moderate(
        &self,
        asset_id: &str,
        provider: Provider,
        thresholds: ModerationThresholds,
    ) -> impl Future<Output = Result<ModerationResult>> + Send;
}

/// Run every selected analysis concurrently.
///
/// The first failure fails the whole call; no partial report is returned.
#[instrument(skip(service, request), fields(asset_id = %request.asset_id, provider = %request.provider))]
pub async fn run_analyses<S: AnalysisService>(
    service: &S,
    request: &AnalysisRequest,
) -> Result<AnalysisReport> {
    let selection = request.selection;
    if selection.is_empty() {
        return Err(DocLibError::config(
            "no analysis selected. Use --summarize, --chapters, --moderate, or --all",
        ));
    }

    let asset_id = request.asset_id.trim();
    if asset_id.is_empty() {
        return Err(DocLibError::validation("asset id must not be empty"));
    }

    let summary = async {
        if selection.summarize {
            service
                .summarize(asset_id, request.provider, request.tone)
                .await
                .map(Some)
        } else {
            Ok(None)
        }
    };

    let chapters = async {
        if selection.chapters {
            service
                .chapters(asset_id, request.provider, &request.language)
                .await
                .map(Some)
        } else {
            Ok(None)
        }
    };

    let moderation = async {
        if selection.moderate {
            service
                .moderate(asset_id, MODERATION_PROVIDER, request.thresholds)
                .await
                .map(Some)
        } else {
            Ok(None)
        }
    };

    let (summary, chapters, moderation) = tokio::try_join!(summary, chapters, moderation)?;

    info!(
        summary = summary.is_some(),
        chapters = chapters.is_some(),
        moderation = moderation.is_some(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        summary,
        chapters,
        moderation,
    })
}

/// Format a chapter offset in seconds as `m:ss`.
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format a 0..1 score as a percentage with one decimal.
pub fn format_percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeService {
        calls: Mutex<Vec<String>>,
        fail_chapters: bool,
    }

    impl AnalysisService for FakeService {
        async fn summarize(
            &self,
            asset_id: &str,
            provider: Provider,
            tone: Tone,
        ) -> Result<SummaryResult> {
            self.calls.lock().unwrap().push(format!("summarize:{provider}:{tone}"));
            Ok(SummaryResult {
                asset_id: asset_id.to_string(),
                title: "Title".into(),
                description: "Description".into(),
                tags: vec!["a".into()],
            })
        }

        async fn chapters(
            &self,
            _asset_id: &str,
            provider: Provider,
            language: &str,
        ) -> Result<ChaptersResult> {
            self.calls.lock().unwrap().push(format!("chapters:{provider}:{language}"));
            if self.fail_chapters {
                return Err(DocLibError::Analysis("chapters unavailable".into()));
            }
            Ok(ChaptersResult {
                language_code: language.to_string(),
                chapters: vec![Chapter {
                    start_time: 0.0,
                    title: "Intro".into(),
                }],
            })
        }

        async fn moderate(
            &self,
            _asset_id: &str,
            provider: Provider,
            _thresholds: ModerationThresholds,
        ) -> Result<ModerationResult> {
            self.calls.lock().unwrap().push(format!("moderate:{provider}"));
            Ok(ModerationResult {
                max_scores: ModerationScores {
                    sexual: 0.1,
                    violence: 0.2,
                },
                exceeds_threshold: false,
            })
        }
    }

    fn request(selection: AnalysisSelection) -> AnalysisRequest {
        AnalysisRequest {
            selection,
            provider: Provider::Google,
            ..AnalysisRequest::new("abc123")
        }
    }

    #[tokio::test]
    async fn runs_only_selected_analyses() {
        let service = FakeService::default();
        let selection = AnalysisSelection {
            summarize: true,
            ..Default::default()
        };

        let report = run_analyses(&service, &request(selection)).await.unwrap();

        assert!(report.summary.is_some());
        assert!(report.chapters.is_none());
        assert!(report.moderation.is_none());
        assert_eq!(*service.calls.lock().unwrap(), vec!["summarize:google:professional"]);
    }

    #[tokio::test]
    async fn moderation_always_uses_openai() {
        let service = FakeService::default();
        let report = run_analyses(&service, &request(AnalysisSelection::all()))
            .await
            .unwrap();

        assert!(report.summary.is_some());
        assert!(report.chapters.is_some());
        assert!(report.moderation.is_some());

        let calls = service.calls.lock().unwrap();
        assert!(calls.contains(&"moderate:openai".to_string()));
        assert!(calls.contains(&"chapters:google:en".to_string()));
    }

    #[tokio::test]
    async fn one_failure_fails_the_batch() {
        let service = FakeService {
            fail_chapters: true,
            ..Default::default()
        };
        let err = run_analyses(&service, &request(AnalysisSelection::all()))
            .await
            .unwrap_err();
        assert!(matches!(err, DocLibError::Analysis(_)));
    }

    #[tokio::test]
    async fn empty_selection_is_config_error() {
        let service = FakeService::default();
        let err = run_analyses(&service, &request(AnalysisSelection::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, DocLibError::Config { .. }));
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_asset_id_is_rejected() {
        let service = FakeService::default();
        let mut req = request(AnalysisSelection::all());
        req.asset_id = "  ".into();
        assert!(run_analyses(&service, &req).await.is_err());
    }

    #[test]
    fn timestamps() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(75.9), "1:15");
        assert_eq!(format_timestamp(3600.0), "60:00");
        assert_eq!(format_timestamp(-3.0), "0:00");
        assert_eq!(format_timestamp(f64::NAN), "0:00");
    }

    #[test]
    fn percentages() {
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(0.7234), "72.3%");
        assert_eq!(format_percent(1.0), "100.0%");
    }
}
