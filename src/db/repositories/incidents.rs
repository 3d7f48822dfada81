use anyhow::Result;
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{encode_vec3, parse_datetime, parse_kind, parse_severity, parse_vec3},
};
use crate::models::SafetyIncident;

fn row_to_incident(row: &Row) -> Result<SafetyIncident> {
    let kind: String = row.get("kind")?;
    let severity: String = row.get("severity")?;
    let created_at: String = row.get("created_at")?;
    let user_position: Option<String> = row.get("user_position")?;

    Ok(SafetyIncident {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        kind: parse_kind(&kind)?,
        severity: parse_severity(&severity)?,
        message: row.get("message")?,
        user_position: parse_vec3(user_position)?,
        auto_paused: row.get("auto_paused")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn insert_incident(&self, incident: &SafetyIncident) -> Result<()> {
        let record = incident.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO safety_incidents
                     (id, session_id, kind, severity, message, user_position, auto_paused, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.session_id,
                    record.kind.as_str(),
                    record.severity.as_str(),
                    record.message,
                    encode_vec3(record.user_position.as_ref())?,
                    record.auto_paused,
                    record.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn list_incidents_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<SafetyIncident>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, kind, severity, message, user_position, auto_paused, created_at
                 FROM safety_incidents
                 WHERE session_id = ?1
                 ORDER BY created_at, id",
            )?;

            let mut rows = stmt.query(params![session_id])?;
            let mut incidents = Vec::new();
            while let Some(row) = rows.next()? {
                incidents.push(row_to_incident(row)?);
            }
            Ok(incidents)
        })
        .await
    }
}
