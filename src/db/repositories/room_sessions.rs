use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{
        encode_vec3, parse_datetime, parse_lighting, parse_optional_datetime,
        parse_optional_severity, parse_platform, parse_status, parse_vec3, to_i64, to_u32,
    },
};
use crate::models::{CalibrationData, RoomGeometry, RoomSession, RoomSessionStatus};

const SESSION_COLUMNS: &str = "id, user_id, sport, difficulty, drill_pattern, \
     width, height, area, ceiling_height, is_flat, aspect_ratio, \
     baseline_distance, room_center, scale_factor, \
     safety_score, obstacle_count, lighting_conditions, reflective_surfaces, \
     platform, average_fps, tracking_quality, status, total_score, \
     total_safety_incidents, last_incident_severity, \
     created_at, updated_at, completed_at";

fn row_to_room_session(row: &Row) -> Result<RoomSession> {
    let started: String = row.get("created_at")?;
    let updated: String = row.get("updated_at")?;
    let completed: Option<String> = row.get("completed_at")?;
    let status: String = row.get("status")?;
    let platform: String = row.get("platform")?;
    let lighting: Option<String> = row.get("lighting_conditions")?;
    let severity: Option<String> = row.get("last_incident_severity")?;
    let room_center: Option<String> = row.get("room_center")?;
    let obstacle_count: i64 = row.get("obstacle_count")?;
    let incident_count: i64 = row.get("total_safety_incidents")?;

    Ok(RoomSession {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        sport: row.get("sport")?,
        difficulty: row.get("difficulty")?,
        drill_pattern: row.get("drill_pattern")?,
        geometry: RoomGeometry {
            width: row.get("width")?,
            height: row.get("height")?,
            area: row.get("area")?,
            ceiling_height: row.get("ceiling_height")?,
            is_flat: row.get("is_flat")?,
            aspect_ratio: row.get("aspect_ratio")?,
        },
        calibration: CalibrationData {
            baseline_distance: row.get("baseline_distance")?,
            room_center: parse_vec3(room_center)?,
            scale_factor: row.get("scale_factor")?,
        },
        safety_score: row.get("safety_score")?,
        obstacle_count: to_u32(obstacle_count, "obstacle_count")?,
        lighting_conditions: parse_lighting(lighting)?,
        reflective_surfaces: row.get("reflective_surfaces")?,
        platform: parse_platform(&platform)?,
        average_fps: row.get("average_fps")?,
        tracking_quality: row.get("tracking_quality")?,
        status: parse_status(&status)?,
        total_score: row.get("total_score")?,
        total_safety_incidents: to_u32(incident_count, "total_safety_incidents")?,
        last_incident_severity: parse_optional_severity(severity)?,
        created_at: parse_datetime(&started, "created_at")?,
        updated_at: parse_datetime(&updated, "updated_at")?,
        completed_at: parse_optional_datetime(completed, "completed_at")?,
    })
}

impl Database {
    pub async fn insert_room_session(&self, session: &RoomSession) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO room_sessions (id, user_id, sport, difficulty, drill_pattern,
                     width, height, area, ceiling_height, is_flat, aspect_ratio,
                     baseline_distance, room_center, scale_factor,
                     safety_score, obstacle_count, lighting_conditions, reflective_surfaces,
                     platform, average_fps, tracking_quality, status, total_score,
                     total_safety_incidents, last_incident_severity,
                     created_at, updated_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                     ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28)",
                params![
                    record.id,
                    record.user_id,
                    record.sport,
                    record.difficulty,
                    record.drill_pattern,
                    record.geometry.width,
                    record.geometry.height,
                    record.geometry.area,
                    record.geometry.ceiling_height,
                    record.geometry.is_flat,
                    record.geometry.aspect_ratio,
                    record.calibration.baseline_distance,
                    encode_vec3(record.calibration.room_center.as_ref())?,
                    record.calibration.scale_factor,
                    record.safety_score,
                    to_i64(record.obstacle_count as u64)?,
                    record.lighting_conditions.map(|l| l.as_str()),
                    record.reflective_surfaces,
                    record.platform.as_str(),
                    record.average_fps,
                    record.tracking_quality,
                    record.status.as_str(),
                    record.total_score,
                    to_i64(record.total_safety_incidents as u64)?,
                    record.last_incident_severity.map(|s| s.as_str()),
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                    record.completed_at.map(|dt| dt.to_rfc3339()),
                ],
            )?;
            Ok(())
        })
        .await
    }

    /// Writes back every field a sync, incident, completion, or resume can
    /// touch. Creation-time identity fields are immutable and not updated.
    pub async fn update_room_session(&self, session: &RoomSession) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE room_sessions
                 SET baseline_distance = ?1,
                     room_center = ?2,
                     scale_factor = ?3,
                     safety_score = ?4,
                     obstacle_count = ?5,
                     lighting_conditions = ?6,
                     reflective_surfaces = ?7,
                     platform = ?8,
                     average_fps = ?9,
                     tracking_quality = ?10,
                     status = ?11,
                     total_score = ?12,
                     total_safety_incidents = ?13,
                     last_incident_severity = ?14,
                     updated_at = ?15,
                     completed_at = ?16
                 WHERE id = ?17",
                params![
                    record.calibration.baseline_distance,
                    encode_vec3(record.calibration.room_center.as_ref())?,
                    record.calibration.scale_factor,
                    record.safety_score,
                    to_i64(record.obstacle_count as u64)?,
                    record.lighting_conditions.map(|l| l.as_str()),
                    record.reflective_surfaces,
                    record.platform.as_str(),
                    record.average_fps,
                    record.tracking_quality,
                    record.status.as_str(),
                    record.total_score,
                    to_i64(record.total_safety_incidents as u64)?,
                    record.last_incident_severity.map(|s| s.as_str()),
                    record.updated_at.to_rfc3339(),
                    record.completed_at.map(|dt| dt.to_rfc3339()),
                    record.id,
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_room_session(&self, session_id: &str) -> Result<Option<RoomSession>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM room_sessions WHERE id = ?1"
            ))?;

            let mut rows = stmt.query(params![session_id])?;
            let session = match rows.next()? {
                Some(row) => Some(row_to_room_session(row)?),
                None => None,
            };
            Ok(session)
        })
        .await
    }

    pub async fn list_sessions_for_user(&self, user_id: &str) -> Result<Vec<RoomSession>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM room_sessions
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id"
            ))?;

            let mut rows = stmt.query(params![user_id])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_room_session(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    /// Completed sessions, most recent first, as trend scoring expects.
    pub async fn list_completed_sessions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<RoomSession>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM room_sessions
                 WHERE user_id = ?1 AND status = 'Completed'
                 ORDER BY completed_at DESC, id"
            ))?;

            let mut rows = stmt.query(params![user_id])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_room_session(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    pub async fn list_stale_open_session_ids(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id FROM room_sessions
                 WHERE status IN ('Active', 'Paused') AND updated_at < ?1
                 ORDER BY updated_at",
            )?;

            let mut rows = stmt.query(params![cutoff.to_rfc3339()])?;
            let mut ids = Vec::new();
            while let Some(row) = rows.next()? {
                ids.push(row.get::<_, String>(0)?);
            }
            Ok(ids)
        })
        .await
    }
}
