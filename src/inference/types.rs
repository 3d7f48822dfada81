use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single-frame (or single-image) analysis request forwarded upstream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub sport: String,
    pub analysis_type: String,
    /// Opaque frame payload (typically a base64 data URL). Never inspected
    /// here.
    pub frame_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Verdict returned by the inference service, relayed unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisVerdict {
    pub score: f64,
    pub feedback: Vec<String>,
    #[serde(default)]
    pub metrics: HashMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub session_id: String,
    pub user_id: String,
    pub sport: String,
    pub analysis_type: String,
    pub frames_submitted: u64,
}

/// End-of-session summary produced upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub overall_score: f64,
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weak_areas: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillRecommendation {
    pub name: String,
    pub focus_area: String,
    pub description: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}
