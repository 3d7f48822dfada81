use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Floor footprint and vertical clearance of the training space, as measured
/// by whichever platform calibrated the room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomGeometry {
    pub width: f64,
    pub height: f64,
    pub area: f64,
    pub ceiling_height: Option<f64>,
    pub is_flat: bool,
    pub aspect_ratio: f64,
}

impl RoomGeometry {
    /// Dimensions must be strictly positive. Aspect-ratio consistency with
    /// width/height is deliberately not checked; the caller is trusted.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(format!("width must be positive, got {}", self.width));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(format!("height must be positive, got {}", self.height));
        }
        if !(self.area.is_finite() && self.area > 0.0) {
            return Err(format!("area must be positive, got {}", self.area));
        }
        if let Some(ceiling) = self.ceiling_height {
            if !(ceiling.is_finite() && ceiling > 0.0) {
                return Err(format!("ceilingHeight must be positive, got {ceiling}"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationData {
    pub baseline_distance: Option<f64>,
    pub room_center: Option<Vec3>,
    pub scale_factor: Option<f64>,
}
