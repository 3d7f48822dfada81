use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    MetricSample, PerformanceMetricSnapshot, Platform, RoomSession, RoomSessionSpec,
    RoomSessionStatus, SafetyIncident,
};

use super::locks::SessionLocks;
use super::merge::{apply_update, RoomSessionUpdate};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSessions {
    pub sessions: Vec<RoomSession>,
    pub by_platform: HashMap<Platform, Vec<RoomSession>>,
}

/// Session plus its full append-only history. One authoritative row per
/// session means there is no shadow copy to diverge from, so consistency is
/// structural rather than checked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub session: RoomSession,
    pub incidents: Vec<SafetyIncident>,
    pub metrics: Vec<PerformanceMetricSnapshot>,
    pub is_consistent: bool,
}

/// Single source of truth for room sessions and their multi-platform merge
/// semantics.
#[derive(Clone)]
pub struct RoomSessionCoordinator {
    db: Database,
    locks: SessionLocks,
}

impl RoomSessionCoordinator {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            locks: SessionLocks::new(),
        }
    }

    /// The lock table is shared with the safety monitor so syncs and
    /// incident logging serialize against each other.
    pub fn locks(&self) -> SessionLocks {
        self.locks.clone()
    }

    pub async fn create_session(&self, spec: RoomSessionSpec) -> EngineResult<RoomSession> {
        spec.geometry
            .validate()
            .map_err(EngineError::validation)?;
        if spec.user_id.trim().is_empty() {
            return Err(EngineError::validation_field("userId is required", "userId"));
        }
        for (value, field) in [
            (spec.average_fps, "averageFps"),
            (spec.tracking_quality, "trackingQuality"),
            (spec.safety_score, "safetyScore"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::validation_field(
                    format!("{field} must be a non-negative number"),
                    field,
                ));
            }
        }

        let now = Utc::now();
        let session = RoomSession {
            id: Uuid::new_v4().to_string(),
            user_id: spec.user_id,
            sport: spec.sport,
            difficulty: spec.difficulty,
            drill_pattern: spec.drill_pattern,
            geometry: spec.geometry,
            calibration: spec.calibration,
            safety_score: spec.safety_score.clamp(0.0, 100.0),
            obstacle_count: spec.obstacle_count,
            lighting_conditions: spec.lighting_conditions,
            reflective_surfaces: spec.reflective_surfaces,
            platform: spec.platform,
            average_fps: spec.average_fps,
            tracking_quality: spec.tracking_quality,
            status: RoomSessionStatus::Active,
            total_score: None,
            total_safety_incidents: 0,
            last_incident_severity: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };

        self.db.insert_room_session(&session).await?;
        info!(
            "Created room session {} for user {} on {}",
            session.id,
            session.user_id,
            session.platform.as_str()
        );
        Ok(session)
    }

    /// Applies one platform's partial update under the per-session lock.
    /// Racing syncs for the same session both succeed; the lock makes the
    /// merge order well-defined.
    pub async fn sync_session(
        &self,
        session_id: &str,
        platform: Platform,
        update: RoomSessionUpdate,
    ) -> EngineResult<RoomSession> {
        update.validate()?;

        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load(session_id).await?;
        if session.status.is_terminal() {
            return Err(EngineError::validation(format!(
                "session {session_id} is {} and no longer accepts syncs",
                session.status.as_str()
            )));
        }

        apply_update(&mut session, platform, &update, Utc::now());
        self.db.update_room_session(&session).await?;
        Ok(session)
    }

    /// Explicit `paused -> active` transition; never part of incident
    /// logging.
    pub async fn resume_session(&self, session_id: &str) -> EngineResult<RoomSession> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load(session_id).await?;
        if session.status != RoomSessionStatus::Paused {
            return Err(EngineError::validation(format!(
                "session {session_id} is {}, only paused sessions can resume",
                session.status.as_str()
            )));
        }

        session.status = RoomSessionStatus::Active;
        session.updated_at = Utc::now();
        self.db.update_room_session(&session).await?;
        info!("Resumed room session {session_id}");
        Ok(session)
    }

    pub async fn complete_session(
        &self,
        session_id: &str,
        total_score: f64,
    ) -> EngineResult<RoomSession> {
        if !total_score.is_finite() {
            return Err(EngineError::validation_field(
                "totalScore must be a number",
                "totalScore",
            ));
        }

        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load(session_id).await?;
        if session.status.is_terminal() {
            return Err(EngineError::validation(format!(
                "session {session_id} is already {}",
                session.status.as_str()
            )));
        }

        let now = Utc::now();
        session.status = RoomSessionStatus::Completed;
        session.total_score = Some(total_score.clamp(0.0, 100.0));
        session.updated_at = now;
        session.completed_at = Some(now);
        self.db.update_room_session(&session).await?;
        self.locks.release(session_id).await;
        info!("Completed room session {session_id}");
        Ok(session)
    }

    /// Appends a metric snapshot. Append-only; no per-session lock needed
    /// beyond the write itself being atomic.
    pub async fn record_metrics(
        &self,
        session_id: &str,
        sample: MetricSample,
    ) -> EngineResult<PerformanceMetricSnapshot> {
        for (value, field) in [
            (sample.adaptation_score, "adaptationScore"),
            (sample.space_utilization_score, "spaceUtilizationScore"),
            (sample.safety_compliance_score, "safetyComplianceScore"),
        ] {
            if !value.is_finite() {
                return Err(EngineError::validation_field(
                    format!("{field} must be a number"),
                    field,
                ));
            }
        }

        self.load(session_id).await?;

        let snapshot = PerformanceMetricSnapshot {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            adaptation_score: sample.adaptation_score,
            space_utilization_score: sample.space_utilization_score,
            safety_compliance_score: sample.safety_compliance_score,
            created_at: Utc::now(),
        };
        self.db.insert_metric_snapshot(&snapshot).await?;
        Ok(snapshot)
    }

    /// Pure read: all of a user's sessions, additionally grouped by the
    /// platform that last synced them.
    pub async fn get_sessions_for_user(&self, user_id: &str) -> EngineResult<UserSessions> {
        let sessions = self.db.list_sessions_for_user(user_id).await?;
        let mut by_platform: HashMap<Platform, Vec<RoomSession>> = HashMap::new();
        for session in &sessions {
            by_platform
                .entry(session.platform)
                .or_default()
                .push(session.clone());
        }
        Ok(UserSessions {
            sessions,
            by_platform,
        })
    }

    pub async fn get_sync_status(&self, session_id: &str) -> EngineResult<SyncStatus> {
        let session = self.load(session_id).await?;
        let incidents = self.db.list_incidents_for_session(session_id).await?;
        let metrics = self.db.list_metrics_for_session(session_id).await?;
        Ok(SyncStatus {
            session,
            incidents,
            metrics,
            is_consistent: true,
        })
    }

    /// Completed sessions, most recent first, the shape the trend engine
    /// consumes.
    pub async fn completed_history(&self, user_id: &str) -> EngineResult<Vec<RoomSession>> {
        Ok(self.db.list_completed_sessions_for_user(user_id).await?)
    }

    /// Reaper entry point: re-checks staleness under the session lock so a
    /// sync that slipped in since the candidate scan wins.
    pub async fn fail_if_stale(
        &self,
        session_id: &str,
        cutoff: DateTime<Utc>,
    ) -> EngineResult<bool> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load(session_id).await?;
        if session.status.is_terminal() || session.updated_at >= cutoff {
            return Ok(false);
        }

        session.status = RoomSessionStatus::Failed;
        session.updated_at = Utc::now();
        self.db.update_room_session(&session).await?;
        self.locks.release(session_id).await;
        Ok(true)
    }

    pub(crate) async fn load(&self, session_id: &str) -> EngineResult<RoomSession> {
        self.db
            .get_room_session(session_id)
            .await?
            .ok_or_else(|| EngineError::session_not_found(session_id))
    }
}
