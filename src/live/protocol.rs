use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inference::{AnalysisVerdict, SessionReport};

/// Opaque handle for one live connection. Issued by the registry at connect
/// time; the transport owns the mapping to its socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Inbound messages on a live connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    StartAnalysis {
        user_id: String,
        sport: String,
        analysis_type: String,
    },
    #[serde(rename_all = "camelCase")]
    CameraFrame { frame_data: String },
    EndAnalysis {},
}

/// Outbound events emitted to a live connection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    AnalysisStarted {
        session_id: String,
        sport: String,
        analysis_type: String,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    AnalysisResult {
        session_id: String,
        result: AnalysisVerdict,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    AnalysisError {
        session_id: String,
        code: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    SessionComplete {
        session_id: String,
        report: Option<SessionReport>,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    Error { code: String, message: String },
}
