use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::{EngineError, EngineResult};

use super::types::{
    AnalysisRequest, AnalysisVerdict, DrillRecommendation, ReportRequest, SessionReport,
};

/// Seam to the external inference service. The engine only ever talks to
/// this trait; production uses [`HttpInferenceClient`], tests substitute
/// stubs.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Analyze a single frame. Called at camera frame rate; a failure is
    /// scoped to this frame only.
    async fn analyze(&self, request: AnalysisRequest) -> EngineResult<AnalysisVerdict>;

    /// End-of-session report, requested best-effort on `end_analysis`.
    async fn session_report(&self, request: ReportRequest) -> EngineResult<SessionReport>;

    async fn recommend_drills(
        &self,
        sport: &str,
        skill_level: &str,
        weak_areas: &[String],
        current_score: f64,
    ) -> EngineResult<Vec<DrillRecommendation>>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DrillRequest<'a> {
    sport: &'a str,
    skill_level: &'a str,
    weak_areas: &'a [String],
    current_score: f64,
}

#[derive(Debug, serde::Deserialize)]
struct DrillResponse {
    drills: Vec<DrillRecommendation>,
}

pub struct HttpInferenceClient {
    client: Client,
    base_url: String,
}

impl HttpInferenceClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> EngineResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| EngineError::upstream(format!("failed to build client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> EngineResult<T>
    where
        B: Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| EngineError::upstream(format!("{path} request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::upstream(format!(
                "{path} returned status {status}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| EngineError::upstream(format!("{path} returned malformed body: {err}")))
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn analyze(&self, request: AnalysisRequest) -> EngineResult<AnalysisVerdict> {
        self.post_json("/analyze", &request).await
    }

    async fn session_report(&self, request: ReportRequest) -> EngineResult<SessionReport> {
        self.post_json("/report", &request).await
    }

    async fn recommend_drills(
        &self,
        sport: &str,
        skill_level: &str,
        weak_areas: &[String],
        current_score: f64,
    ) -> EngineResult<Vec<DrillRecommendation>> {
        let request = DrillRequest {
            sport,
            skill_level,
            weak_areas,
            current_score,
        };
        let response: DrillResponse = self.post_json("/drills", &request).await?;
        Ok(response.drills)
    }
}
