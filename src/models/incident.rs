use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Vec3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    BoundaryViolation,
    CollisionRisk,
    PoseUnsafe,
    TrackingLost,
    CeilingCollision,
    WallProximity,
    FloorHazard,
    MovementRestriction,
}

impl IncidentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentKind::BoundaryViolation => "boundary_violation",
            IncidentKind::CollisionRisk => "collision_risk",
            IncidentKind::PoseUnsafe => "pose_unsafe",
            IncidentKind::TrackingLost => "tracking_lost",
            IncidentKind::CeilingCollision => "ceiling_collision",
            IncidentKind::WallProximity => "wall_proximity",
            IncidentKind::FloorHazard => "floor_hazard",
            IncidentKind::MovementRestriction => "movement_restriction",
        }
    }
}

/// Canonical severity scale. The native-AR reporting path uses
/// low/medium/high/critical; those values map onto this scale at the serde
/// boundary (low -> info, medium/high -> warning) so only one scale exists
/// past deserialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum IncidentSeverity {
    #[serde(alias = "low")]
    Info,
    #[serde(alias = "medium", alias = "high")]
    Warning,
    Critical,
}

impl IncidentSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentSeverity::Info => "info",
            IncidentSeverity::Warning => "warning",
            IncidentSeverity::Critical => "critical",
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, IncidentSeverity::Critical)
    }
}

/// Incoming incident payload from either platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReport {
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    pub severity: IncidentSeverity,
    pub message: String,
    pub user_position: Option<Vec3>,
}

/// Append-only log entry tied to a room session. Never mutated after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyIncident {
    pub id: String,
    pub session_id: String,
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    pub severity: IncidentSeverity,
    pub message: String,
    pub user_position: Option<Vec3>,
    /// True on the one incident that forced the automatic pause.
    pub auto_paused: bool,
    pub created_at: DateTime<Utc>,
}
