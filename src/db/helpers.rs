use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::models::{
    IncidentKind, IncidentSeverity, LightingConditions, Platform, RoomSessionStatus, Vec3,
};

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u32(value: i64, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{field} out of range: {value}"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_status(value: &str) -> Result<RoomSessionStatus> {
    match value {
        "Active" => Ok(RoomSessionStatus::Active),
        "Paused" => Ok(RoomSessionStatus::Paused),
        "Completed" => Ok(RoomSessionStatus::Completed),
        "Failed" => Ok(RoomSessionStatus::Failed),
        other => Err(anyhow!("unknown session status {other}")),
    }
}

pub fn parse_platform(value: &str) -> Result<Platform> {
    match value {
        "web" => Ok(Platform::Web),
        "nativeAr" => Ok(Platform::NativeAr),
        other => Err(anyhow!("unknown platform {other}")),
    }
}

pub fn parse_severity(value: &str) -> Result<IncidentSeverity> {
    match value {
        "info" => Ok(IncidentSeverity::Info),
        "warning" => Ok(IncidentSeverity::Warning),
        "critical" => Ok(IncidentSeverity::Critical),
        other => Err(anyhow!("unknown incident severity {other}")),
    }
}

pub fn parse_optional_severity(value: Option<String>) -> Result<Option<IncidentSeverity>> {
    value.as_deref().map(parse_severity).transpose()
}

pub fn parse_kind(value: &str) -> Result<IncidentKind> {
    match value {
        "boundary_violation" => Ok(IncidentKind::BoundaryViolation),
        "collision_risk" => Ok(IncidentKind::CollisionRisk),
        "pose_unsafe" => Ok(IncidentKind::PoseUnsafe),
        "tracking_lost" => Ok(IncidentKind::TrackingLost),
        "ceiling_collision" => Ok(IncidentKind::CeilingCollision),
        "wall_proximity" => Ok(IncidentKind::WallProximity),
        "floor_hazard" => Ok(IncidentKind::FloorHazard),
        "movement_restriction" => Ok(IncidentKind::MovementRestriction),
        other => Err(anyhow!("unknown incident kind {other}")),
    }
}

pub fn parse_lighting(value: Option<String>) -> Result<Option<LightingConditions>> {
    match value.as_deref() {
        None => Ok(None),
        Some("dim") => Ok(Some(LightingConditions::Dim)),
        Some("normal") => Ok(Some(LightingConditions::Normal)),
        Some("bright") => Ok(Some(LightingConditions::Bright)),
        Some(other) => Err(anyhow!("unknown lighting conditions {other}")),
    }
}

pub fn encode_vec3(value: Option<&Vec3>) -> Result<Option<String>> {
    value
        .map(|v| serde_json::to_string(v).context("failed to encode position"))
        .transpose()
}

pub fn parse_vec3(value: Option<String>) -> Result<Option<Vec3>> {
    value
        .map(|raw| serde_json::from_str(&raw).with_context(|| format!("invalid position '{raw}'")))
        .transpose()
}
