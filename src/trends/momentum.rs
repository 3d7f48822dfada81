use serde::{Deserialize, Serialize};

use crate::models::RoomSession;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

/// Momentum of `totalScore` across a user's completed sessions.
///
/// `history` is ordered most-recent-first. The recent bucket takes the first
/// min(5, N-1) sessions so the older bucket is never empty once two sessions
/// exist.
pub fn score_trend(history: &[RoomSession]) -> Trend {
    let Some((recent, older)) = split_buckets(history) else {
        return Trend::InsufficientData;
    };

    let recent_mean = mean(recent.iter().map(session_score));
    let older_mean = mean(older.iter().map(session_score));

    if recent_mean > older_mean * 1.1 {
        Trend::Improving
    } else if recent_mean < older_mean * 0.9 {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Momentum of incident rate, inverted: fewer incidents per session is
/// better.
pub fn safety_trend(history: &[RoomSession]) -> Trend {
    let Some((recent, older)) = split_buckets(history) else {
        return Trend::InsufficientData;
    };

    let recent_rate = mean(recent.iter().map(incident_count));
    let older_rate = mean(older.iter().map(incident_count));

    if recent_rate < older_rate * 0.8 {
        Trend::Improving
    } else if recent_rate > older_rate * 1.2 {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

fn split_buckets(history: &[RoomSession]) -> Option<(&[RoomSession], &[RoomSession])> {
    if history.len() < 2 {
        return None;
    }
    let recent_len = 5.min(history.len() - 1);
    Some(history.split_at(recent_len))
}

fn session_score(session: &RoomSession) -> f64 {
    session.total_score.unwrap_or(0.0)
}

fn incident_count(session: &RoomSession) -> f64 {
    session.total_safety_incidents as f64
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::{
        CalibrationData, Platform, RoomGeometry, RoomSessionStatus,
    };

    fn completed(total_score: f64, incidents: u32) -> RoomSession {
        let now = Utc::now();
        RoomSession {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "user-1".into(),
            sport: "football".into(),
            difficulty: "intermediate".into(),
            drill_pattern: "micro_ladder".into(),
            geometry: RoomGeometry {
                width: 3.0,
                height: 3.0,
                area: 9.0,
                ceiling_height: None,
                is_flat: true,
                aspect_ratio: 1.0,
            },
            calibration: CalibrationData::default(),
            safety_score: 100.0,
            obstacle_count: 0,
            lighting_conditions: None,
            reflective_surfaces: false,
            platform: Platform::Web,
            average_fps: 30.0,
            tracking_quality: 0.9,
            status: RoomSessionStatus::Completed,
            total_score: Some(total_score),
            total_safety_incidents: incidents,
            last_incident_severity: None,
            created_at: now,
            updated_at: now,
            completed_at: Some(now),
        }
    }

    #[test]
    fn single_session_is_insufficient() {
        let history = vec![completed(90.0, 0)];
        assert_eq!(score_trend(&history), Trend::InsufficientData);
        assert_eq!(safety_trend(&history), Trend::InsufficientData);
    }

    #[test]
    fn two_sessions_improving_boundary() {
        // 89 > 80 * 1.1 = 88
        let history = vec![completed(89.0, 0), completed(80.0, 0)];
        assert_eq!(score_trend(&history), Trend::Improving);
    }

    #[test]
    fn two_sessions_stable_band() {
        // 85 is neither > 88 nor < 72
        let history = vec![completed(85.0, 0), completed(80.0, 0)];
        assert_eq!(score_trend(&history), Trend::Stable);
    }

    #[test]
    fn declining_score() {
        let history = vec![completed(60.0, 0), completed(80.0, 0)];
        assert_eq!(score_trend(&history), Trend::Declining);
    }

    #[test]
    fn recent_bucket_caps_at_five() {
        // Seven sessions: recent = first 5 (all 90), older = last 2 (all 50).
        let mut history: Vec<_> = (0..5).map(|_| completed(90.0, 0)).collect();
        history.push(completed(50.0, 0));
        history.push(completed(50.0, 0));
        assert_eq!(score_trend(&history), Trend::Improving);
    }

    #[test]
    fn fewer_incidents_is_improving() {
        // recent rate 0 < older rate 2 * 0.8
        let history = vec![completed(80.0, 0), completed(80.0, 2)];
        assert_eq!(safety_trend(&history), Trend::Improving);
    }

    #[test]
    fn more_incidents_is_declining() {
        let history = vec![completed(80.0, 3), completed(80.0, 1)];
        assert_eq!(safety_trend(&history), Trend::Declining);
    }

    #[test]
    fn incident_free_history_is_stable() {
        let history = vec![completed(80.0, 0), completed(80.0, 0)];
        assert_eq!(safety_trend(&history), Trend::Stable);
    }

    #[test]
    fn new_incidents_after_clean_history_decline() {
        // older rate is zero; any recent incident reads as declining
        let history = vec![completed(80.0, 1), completed(80.0, 0)];
        assert_eq!(safety_trend(&history), Trend::Declining);
    }
}
