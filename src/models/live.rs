use chrono::{DateTime, Utc};
use serde::Serialize;

/// Ephemeral per-connection analysis session. Owned exclusively by the
/// connection's registry entry and never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSession {
    pub session_id: String,
    pub user_id: String,
    pub sport: String,
    pub analysis_type: String,
    pub is_active: bool,
    pub started_at: DateTime<Utc>,
    pub frames_submitted: u64,
}
