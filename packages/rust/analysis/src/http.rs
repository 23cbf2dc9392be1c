//! JSON/HTTP client for the analysis service.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use doclib_shared::{AnalysisCredentials, DocLibError, Result};

use crate::AnalysisService;
use crate::types::{
    ChaptersResult, ModerationResult, ModerationThresholds, Provider, SummaryResult, Tone,
};

const USER_AGENT: &str = concat!("doclib/", env!("CARGO_PKG_VERSION"));

/// Longest error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 200;

#[derive(Serialize)]
struct SummaryBody<'a> {
    asset_id: &'a str,
    provider: Provider,
    tone: Tone,
    include_transcript: bool,
}

#[derive(Serialize)]
struct ChaptersBody<'a> {
    asset_id: &'a str,
    provider: Provider,
    language: &'a str,
}

#[derive(Serialize)]
struct ModerationBody<'a> {
    asset_id: &'a str,
    provider: Provider,
    thresholds: ModerationThresholds,
}

/// [`AnalysisService`] backed by the remote analysis API.
#[derive(Debug, Clone)]
pub struct HttpAnalysisService {
    client: Client,
    endpoint: Url,
    credentials: AnalysisCredentials,
}

impl HttpAnalysisService {
    pub fn new(endpoint: &str, credentials: AnalysisCredentials, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DocLibError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: parse_endpoint(endpoint)?,
            credentials,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .endpoint
            .join(path)
            .map_err(|e| DocLibError::validation(format!("cannot build URL for '{path}': {e}")))?;

        let response = self
            .client
            .post(url.clone())
            .basic_auth(&self.credentials.token_id, Some(&self.credentials.token_secret))
            .json(body)
            .send()
            .await
            .map_err(|e| DocLibError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DocLibError::Network(format!("{url}: failed to read body: {e}")))?;

        if !status.is_success() {
            let snippet: String = text.trim().chars().take(MAX_ERROR_BODY).collect();
            return Err(DocLibError::Analysis(format!("{url}: HTTP {status}: {snippet}")));
        }

        debug!(%url, %status, bytes = text.len(), "analysis response received");

        serde_json::from_str(&text)
            .map_err(|e| DocLibError::Analysis(format!("{url}: unexpected response body: {e}")))
    }
}

impl AnalysisService for HttpAnalysisService {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn summarize(&self, asset_id: &str, provider: Provider, tone: Tone) -> Result<SummaryResult> {
        let body = SummaryBody {
            asset_id,
            provider,
            tone,
            include_transcript: true,
        };
        self.post("summaries", &body).await
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn chapters(
        &self,
        asset_id: &str,
        provider: Provider,
        language: &str,
    ) -> Result<ChaptersResult> {
        let body = ChaptersBody {
            asset_id,
            provider,
            language,
        };
        self.post("chapters", &body).await
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn moderate(
        &self,
        asset_id: &str,
        provider: Provider,
        thresholds: ModerationThresholds,
    ) -> Result<ModerationResult> {
        let body = ModerationBody {
            asset_id,
            provider,
            thresholds,
        };
        self.post("moderation", &body).await
    }
}

/// Parse the service endpoint, making sure relative joins stay beneath it.
fn parse_endpoint(raw: &str) -> Result<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    let url = Url::parse(&with_slash).map_err(|e| {
        DocLibError::config(format!(
            "invalid analysis endpoint '{raw}': {e}\nSet DOCLIB_ANALYSIS_ENDPOINT to an absolute URL"
        ))
    })?;

    if url.cannot_be_a_base() {
        return Err(DocLibError::config(format!(
            "analysis endpoint '{raw}' cannot be used as a base URL"
        )));
    }

    Ok(url)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
