use anyhow::Result;
use rusqlite::{params, Row};

use crate::db::{connection::Database, helpers::parse_datetime};
use crate::models::PerformanceMetricSnapshot;

fn row_to_snapshot(row: &Row) -> Result<PerformanceMetricSnapshot> {
    let created_at: String = row.get("created_at")?;

    Ok(PerformanceMetricSnapshot {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        adaptation_score: row.get("adaptation_score")?,
        space_utilization_score: row.get("space_utilization_score")?,
        safety_compliance_score: row.get("safety_compliance_score")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn insert_metric_snapshot(
        &self,
        snapshot: &PerformanceMetricSnapshot,
    ) -> Result<()> {
        let record = snapshot.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO performance_metrics
                     (id, session_id, adaptation_score, space_utilization_score,
                      safety_compliance_score, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    record.session_id,
                    record.adaptation_score,
                    record.space_utilization_score,
                    record.safety_compliance_score,
                    record.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn list_metrics_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<PerformanceMetricSnapshot>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, adaptation_score, space_utilization_score,
                        safety_compliance_score, created_at
                 FROM performance_metrics
                 WHERE session_id = ?1
                 ORDER BY created_at, id",
            )?;

            let mut rows = stmt.query(params![session_id])?;
            let mut snapshots = Vec::new();
            while let Some(row) = rows.next()? {
                snapshots.push(row_to_snapshot(row)?);
            }
            Ok(snapshots)
        })
        .await
    }
}
