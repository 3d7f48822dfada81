use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{LightingConditions, Platform, RoomSession, Vec3};

/// Partial telemetry payload from one platform's sync call. Every field is
/// optional; omitted fields leave the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSessionUpdate {
    pub average_fps: Option<f64>,
    pub tracking_quality: Option<f64>,
    pub safety_score: Option<f64>,
    pub baseline_distance: Option<f64>,
    pub room_center: Option<Vec3>,
    pub scale_factor: Option<f64>,
    pub obstacle_count: Option<u32>,
    pub lighting_conditions: Option<LightingConditions>,
    pub reflective_surfaces: Option<bool>,
}

impl RoomSessionUpdate {
    pub fn validate(&self) -> EngineResult<()> {
        for (value, field) in [
            (self.average_fps, "averageFps"),
            (self.tracking_quality, "trackingQuality"),
            (self.safety_score, "safetyScore"),
            (self.baseline_distance, "baselineDistance"),
            (self.scale_factor, "scaleFactor"),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(EngineError::validation_field(
                        format!("{field} must be a non-negative number, got {value}"),
                        field,
                    ));
                }
            }
        }
        if let Some(center) = &self.room_center {
            if !center.is_finite() {
                return Err(EngineError::validation_field(
                    "roomCenter must be finite",
                    "roomCenter",
                ));
            }
        }
        Ok(())
    }
}

/// Field-level merge of one sync into the stored session.
///
/// Quality metrics (`averageFps`, `trackingQuality`) take the max of stored
/// and incoming so a platform with weaker sensing never regresses what a
/// better one recorded. The safety score and environment fields always take
/// the incoming value: conditions can genuinely degrade or improve between
/// samples, and the latest observation wins.
pub fn apply_update(
    session: &mut RoomSession,
    platform: Platform,
    update: &RoomSessionUpdate,
    now: chrono::DateTime<chrono::Utc>,
) {
    if let Some(fps) = update.average_fps {
        session.average_fps = session.average_fps.max(fps);
    }
    if let Some(quality) = update.tracking_quality {
        session.tracking_quality = session.tracking_quality.max(quality);
    }
    if let Some(score) = update.safety_score {
        session.safety_score = score.clamp(0.0, 100.0);
    }
    if let Some(distance) = update.baseline_distance {
        session.calibration.baseline_distance = Some(distance);
    }
    if let Some(center) = update.room_center {
        session.calibration.room_center = Some(center);
    }
    if let Some(factor) = update.scale_factor {
        session.calibration.scale_factor = Some(factor);
    }
    if let Some(count) = update.obstacle_count {
        session.obstacle_count = count;
    }
    if let Some(lighting) = update.lighting_conditions {
        session.lighting_conditions = Some(lighting);
    }
    if let Some(reflective) = update.reflective_surfaces {
        session.reflective_surfaces = reflective;
    }

    // Audit only: records who reported last, grants nothing.
    session.platform = platform;
    session.updated_at = now;
}
