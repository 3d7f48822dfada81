use serde::{Deserialize, Serialize};

use crate::models::RoomGeometry;

pub const LOW_CEILING_WARNING: &str =
    "Ceiling below 2.3m: overhead movements restricted, seated drills substituted";
pub const CONFINED_SPACE_WARNING: &str =
    "Confined space (under 4m²): widened tolerances and reduced target count";
pub const INSUFFICIENT_CLEARANCE_WARNING: &str =
    "Insufficient ceiling clearance for basketball: overhead movements disabled";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DrillPattern {
    #[serde(rename = "dribble_box")]
    DribbleBox,
    #[serde(rename = "micro_ladder")]
    MicroLadder,
    #[serde(rename = "figure_8")]
    Figure8,
    #[serde(rename = "seated_control")]
    SeatedControl,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Adaptations {
    pub tolerance_multiplier: Option<f64>,
    pub reduced_target_count: bool,
    pub no_overhead_movements: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRecommendation {
    pub recommended_patterns: Vec<DrillPattern>,
    pub safety_warnings: Vec<String>,
    pub adaptations: Adaptations,
}

/// Space-constrained drill pattern rules. Every rule is additive; several
/// may fire for the same room and none short-circuits the rest.
pub fn recommend_patterns(geometry: &RoomGeometry, sport: &str) -> PatternRecommendation {
    let mut patterns = Vec::new();
    let mut warnings = Vec::new();
    let mut adaptations = Adaptations::default();

    let width = geometry.width;
    let height = geometry.height;

    if width >= 2.5 && height >= 2.5 && geometry.is_flat {
        patterns.push(DrillPattern::DribbleBox);
    }
    if width >= 2.0 || height >= 2.0 {
        patterns.push(DrillPattern::MicroLadder);
    }
    if width >= 1.8 && height >= 1.8 {
        patterns.push(DrillPattern::Figure8);
    }

    if let Some(ceiling) = geometry.ceiling_height {
        if ceiling < 2.3 {
            warnings.push(LOW_CEILING_WARNING.to_string());
            if !patterns.contains(&DrillPattern::SeatedControl) {
                patterns.push(DrillPattern::SeatedControl);
            }
        }
    }

    if width * height < 4.0 {
        warnings.push(CONFINED_SPACE_WARNING.to_string());
        adaptations.tolerance_multiplier = Some(1.5);
        adaptations.reduced_target_count = true;
    }

    if sport == "basketball" && geometry.ceiling_height.unwrap_or(3.0) < 2.8 {
        warnings.push(INSUFFICIENT_CLEARANCE_WARNING.to_string());
        adaptations.no_overhead_movements = true;
    }

    PatternRecommendation {
        recommended_patterns: patterns,
        safety_warnings: warnings,
        adaptations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(width: f64, height: f64, ceiling: Option<f64>, is_flat: bool) -> RoomGeometry {
        RoomGeometry {
            width,
            height,
            area: width * height,
            ceiling_height: ceiling,
            is_flat,
            aspect_ratio: width / height,
        }
    }

    #[test]
    fn generous_flat_room_gets_all_patterns() {
        let rec = recommend_patterns(&geometry(3.0, 3.0, None, true), "football");
        assert_eq!(
            rec.recommended_patterns,
            vec![
                DrillPattern::DribbleBox,
                DrillPattern::MicroLadder,
                DrillPattern::Figure8
            ]
        );
        assert!(rec.safety_warnings.is_empty());
        assert_eq!(rec.adaptations, Adaptations::default());
    }

    #[test]
    fn confined_room_widens_tolerances() {
        let rec = recommend_patterns(&geometry(1.5, 1.5, None, true), "football");
        assert!(rec
            .safety_warnings
            .iter()
            .any(|w| w == CONFINED_SPACE_WARNING));
        assert_eq!(rec.adaptations.tolerance_multiplier, Some(1.5));
        assert!(rec.adaptations.reduced_target_count);
        assert!(rec.recommended_patterns.is_empty());
    }

    #[test]
    fn uneven_floor_blocks_dribble_box_only() {
        let rec = recommend_patterns(&geometry(3.0, 3.0, None, false), "football");
        assert!(!rec.recommended_patterns.contains(&DrillPattern::DribbleBox));
        assert!(rec.recommended_patterns.contains(&DrillPattern::MicroLadder));
        assert!(rec.recommended_patterns.contains(&DrillPattern::Figure8));
    }

    #[test]
    fn low_ceiling_forces_seated_control() {
        let rec = recommend_patterns(&geometry(3.0, 3.0, Some(2.1), true), "football");
        assert!(rec
            .recommended_patterns
            .contains(&DrillPattern::SeatedControl));
        assert!(rec.safety_warnings.iter().any(|w| w == LOW_CEILING_WARNING));
    }

    #[test]
    fn basketball_clearance_rule_uses_default_ceiling() {
        // No measured ceiling: the 3.0 default clears the 2.8 bar.
        let rec = recommend_patterns(&geometry(3.0, 3.0, None, true), "basketball");
        assert!(!rec.adaptations.no_overhead_movements);

        let rec = recommend_patterns(&geometry(3.0, 3.0, Some(2.5), true), "basketball");
        assert!(rec.adaptations.no_overhead_movements);
        assert!(rec
            .safety_warnings
            .iter()
            .any(|w| w == INSUFFICIENT_CLEARANCE_WARNING));
    }

    #[test]
    fn narrow_corridor_still_gets_micro_ladder() {
        // 1.0 x 2.2 room: OR rule fires on height alone.
        let rec = recommend_patterns(&geometry(1.0, 2.2, None, true), "football");
        assert_eq!(rec.recommended_patterns, vec![DrillPattern::MicroLadder]);
        // 2.2 m² is also confined
        assert!(rec.adaptations.reduced_target_count);
    }

    #[test]
    fn rules_stack_in_tight_low_room() {
        let rec = recommend_patterns(&geometry(1.9, 1.9, Some(2.0), true), "basketball");
        assert_eq!(
            rec.recommended_patterns,
            vec![DrillPattern::Figure8, DrillPattern::SeatedControl]
        );
        assert_eq!(rec.safety_warnings.len(), 3);
        assert_eq!(rec.adaptations.tolerance_multiplier, Some(1.5));
        assert!(rec.adaptations.reduced_target_count);
        assert!(rec.adaptations.no_overhead_movements);
    }
}
