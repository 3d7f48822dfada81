use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CalibrationData, IncidentSeverity, RoomGeometry};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RoomSessionStatus {
    Active,
    Paused,
    Completed,
    Failed,
}

impl RoomSessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomSessionStatus::Active => "Active",
            RoomSessionStatus::Paused => "Paused",
            RoomSessionStatus::Completed => "Completed",
            RoomSessionStatus::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RoomSessionStatus::Completed | RoomSessionStatus::Failed)
    }
}

/// Which client reported the most recent sync. Audit field only, never a
/// lock.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    Web,
    NativeAr,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::NativeAr => "nativeAr",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LightingConditions {
    Dim,
    Normal,
    Bright,
}

impl LightingConditions {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightingConditions::Dim => "dim",
            LightingConditions::Normal => "normal",
            LightingConditions::Bright => "bright",
        }
    }
}

/// Durable, multi-platform confined-space training session. Created once by
/// the first platform to report in, then updated in place by syncs from
/// either platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSession {
    pub id: String,
    pub user_id: String,
    pub sport: String,
    pub difficulty: String,
    pub drill_pattern: String,
    pub geometry: RoomGeometry,
    pub calibration: CalibrationData,
    /// Most recent safety assessment, always within [0, 100].
    pub safety_score: f64,
    pub obstacle_count: u32,
    pub lighting_conditions: Option<LightingConditions>,
    pub reflective_surfaces: bool,
    pub platform: Platform,
    pub average_fps: f64,
    pub tracking_quality: f64,
    pub status: RoomSessionStatus,
    /// Set once when the session completes; consumed by trend scoring.
    pub total_score: Option<f64>,
    pub total_safety_incidents: u32,
    pub last_incident_severity: Option<IncidentSeverity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Creation payload for a room session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSessionSpec {
    pub user_id: String,
    pub sport: String,
    pub difficulty: String,
    pub drill_pattern: String,
    pub geometry: RoomGeometry,
    #[serde(default)]
    pub calibration: CalibrationData,
    #[serde(default = "default_safety_score")]
    pub safety_score: f64,
    #[serde(default)]
    pub obstacle_count: u32,
    #[serde(default)]
    pub lighting_conditions: Option<LightingConditions>,
    #[serde(default)]
    pub reflective_surfaces: bool,
    pub platform: Platform,
    #[serde(default)]
    pub average_fps: f64,
    #[serde(default)]
    pub tracking_quality: f64,
}

fn default_safety_score() -> f64 {
    100.0
}
