use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-sync scores reported by a platform, appended verbatim to the
/// session's metric history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    pub adaptation_score: f64,
    pub space_utilization_score: f64,
    pub safety_compliance_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetricSnapshot {
    pub id: String,
    pub session_id: String,
    pub adaptation_score: f64,
    pub space_utilization_score: f64,
    pub safety_compliance_score: f64,
    pub created_at: DateTime<Utc>,
}
