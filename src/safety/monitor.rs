use chrono::Utc;
use log::warn;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{EngineError, EngineResult};
use crate::models::{IncidentReport, RoomSessionStatus, SafetyIncident};
use crate::room::SessionLocks;

/// Severity-driven state machine over room-session status.
///
/// Only a critical incident has a transition side effect: the first one seen
/// while the session is active pauses it, exactly once. Everything else is
/// recorded and changes nothing.
#[derive(Clone)]
pub struct SafetyMonitor {
    db: Database,
    locks: SessionLocks,
}

impl SafetyMonitor {
    /// `locks` must be the coordinator's lock table so incident logging
    /// serializes with sync writes for the same session.
    pub fn new(db: Database, locks: SessionLocks) -> Self {
        Self { db, locks }
    }

    pub async fn log_incident(
        &self,
        session_id: &str,
        report: IncidentReport,
    ) -> EngineResult<SafetyIncident> {
        // A malformed report is rejected before any state is touched.
        if report.message.trim().is_empty() {
            return Err(EngineError::validation_field(
                "incident message must not be empty",
                "message",
            ));
        }
        if let Some(position) = &report.user_position {
            if !position.is_finite() {
                return Err(EngineError::validation_field(
                    "userPosition must be finite",
                    "userPosition",
                ));
            }
        }

        let _guard = self.locks.acquire(session_id).await;
        let mut session = self
            .db
            .get_room_session(session_id)
            .await?
            .ok_or_else(|| EngineError::session_not_found(session_id))?;

        let now = Utc::now();
        let auto_paused =
            report.severity.is_critical() && session.status == RoomSessionStatus::Active;

        let incident = SafetyIncident {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            kind: report.kind,
            severity: report.severity,
            message: report.message,
            user_position: report.user_position,
            auto_paused,
            created_at: now,
        };
        self.db.insert_incident(&incident).await?;

        if auto_paused {
            session.status = RoomSessionStatus::Paused;
            warn!(
                "Critical {} incident paused room session {session_id}",
                incident.kind.as_str()
            );
        }
        session.total_safety_incidents += 1;
        session.last_incident_severity = Some(incident.severity);
        session.updated_at = now;
        self.db.update_room_session(&session).await?;

        Ok(incident)
    }
}
