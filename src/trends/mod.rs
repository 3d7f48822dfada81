mod momentum;
mod patterns;

pub use momentum::{safety_trend, score_trend, Trend};
pub use patterns::{
    recommend_patterns, Adaptations, DrillPattern, PatternRecommendation,
    CONFINED_SPACE_WARNING, INSUFFICIENT_CLEARANCE_WARNING, LOW_CEILING_WARNING,
};
