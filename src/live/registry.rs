use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::inference::{AnalysisRequest, InferenceClient, ReportRequest};
use crate::models::LiveSession;

use super::protocol::{ClientMessage, ConnectionId, ServerMessage};

pub type EventSink = mpsc::UnboundedSender<ServerMessage>;

struct ConnectionEntry {
    sink: EventSink,
    session: Option<LiveSession>,
}

/// Per-connection analysis sessions and their protocol state machine
/// (`idle -> analyzing -> idle`). One entry per open connection; entries
/// never outlive their connection and are never persisted.
pub struct LiveSessionRegistry {
    gateway: Arc<dyn InferenceClient>,
    connections: Mutex<HashMap<ConnectionId, ConnectionEntry>>,
}

impl LiveSessionRegistry {
    pub fn new(gateway: Arc<dyn InferenceClient>) -> Self {
        Self {
            gateway,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a connection and its outbound sink. The transport calls
    /// this once per accepted socket.
    pub async fn connect(&self, sink: EventSink) -> ConnectionId {
        let id = ConnectionId::new();
        self.connections
            .lock()
            .await
            .insert(id, ConnectionEntry { sink, session: None });
        debug!("Live connection {id} registered");
        id
    }

    /// Idempotent silent cleanup on close or transport error. No outbound
    /// messages, no effect on any other connection.
    pub async fn disconnect(&self, connection: &ConnectionId) {
        if let Some(entry) = self.connections.lock().await.remove(connection) {
            if let Some(session) = entry.session {
                info!(
                    "Connection {connection} closed with live session {} still open",
                    session.session_id
                );
            }
        }
    }

    pub async fn handle_message(
        &self,
        connection: &ConnectionId,
        message: ClientMessage,
    ) -> EngineResult<()> {
        match message {
            ClientMessage::StartAnalysis {
                user_id,
                sport,
                analysis_type,
            } => {
                self.start_analysis(connection, user_id, sport, analysis_type)
                    .await
            }
            ClientMessage::CameraFrame { frame_data } => {
                self.submit_frame(connection, frame_data).await
            }
            ClientMessage::EndAnalysis {} => self.end_analysis(connection).await,
        }
    }

    pub async fn start_analysis(
        &self,
        connection: &ConnectionId,
        user_id: String,
        sport: String,
        analysis_type: String,
    ) -> EngineResult<()> {
        let mut connections = self.connections.lock().await;
        let entry = entry_mut(&mut connections, connection)?;

        if entry.session.as_ref().is_some_and(|s| s.is_active) {
            let err = EngineError::AlreadyActive {
                connection: connection.to_string(),
            };
            emit_error(&entry.sink, &err);
            return Ok(());
        }

        let session = LiveSession {
            session_id: Uuid::new_v4().to_string(),
            user_id,
            sport: sport.clone(),
            analysis_type: analysis_type.clone(),
            is_active: true,
            started_at: Utc::now(),
            frames_submitted: 0,
        };
        let session_id = session.session_id.clone();
        entry.session = Some(session);

        emit(
            &entry.sink,
            ServerMessage::AnalysisStarted {
                session_id: session_id.clone(),
                sport,
                analysis_type,
                timestamp: Utc::now(),
            },
        );
        info!("Started live analysis {session_id} on connection {connection}");
        Ok(())
    }

    /// Forwards one frame to the gateway. A gateway failure is scoped to
    /// this frame: the session stays active and the next frame is accepted.
    pub async fn submit_frame(
        &self,
        connection: &ConnectionId,
        frame_data: String,
    ) -> EngineResult<()> {
        // Snapshot what the gateway call needs, then release the map lock
        // so a slow inference round-trip never blocks other connections.
        let (sink, session_id, sport, analysis_type) = {
            let mut connections = self.connections.lock().await;
            let entry = entry_mut(&mut connections, connection)?;

            match entry.session.as_mut() {
                Some(session) if session.is_active => {
                    session.frames_submitted += 1;
                    (
                        entry.sink.clone(),
                        session.session_id.clone(),
                        session.sport.clone(),
                        session.analysis_type.clone(),
                    )
                }
                _ => {
                    let err = EngineError::NoActiveSession {
                        connection: connection.to_string(),
                    };
                    emit_error(&entry.sink, &err);
                    return Ok(());
                }
            }
        };

        let request = AnalysisRequest {
            sport,
            analysis_type,
            frame_data,
            session_id: Some(session_id.clone()),
        };

        match self.gateway.analyze(request).await {
            Ok(verdict) => emit(
                &sink,
                ServerMessage::AnalysisResult {
                    session_id,
                    result: verdict,
                    timestamp: Utc::now(),
                },
            ),
            Err(err) => {
                warn!("Frame analysis failed for session {session_id}: {err}");
                emit(
                    &sink,
                    ServerMessage::AnalysisError {
                        session_id,
                        code: err.code().to_string(),
                        message: err.to_string(),
                        timestamp: Utc::now(),
                    },
                );
            }
        }
        Ok(())
    }

    /// Ends the connection's session: deactivates it, fetches the final
    /// report best-effort, emits `session_complete` exactly once.
    pub async fn end_analysis(&self, connection: &ConnectionId) -> EngineResult<()> {
        let (sink, session) = {
            let mut connections = self.connections.lock().await;
            let entry = entry_mut(&mut connections, connection)?;

            match entry.session.take() {
                Some(mut session) => {
                    session.is_active = false;
                    (entry.sink.clone(), session)
                }
                None => {
                    let err = EngineError::NoActiveSession {
                        connection: connection.to_string(),
                    };
                    emit_error(&entry.sink, &err);
                    return Ok(());
                }
            }
        };

        let report = match self
            .gateway
            .session_report(ReportRequest {
                session_id: session.session_id.clone(),
                user_id: session.user_id.clone(),
                sport: session.sport.clone(),
                analysis_type: session.analysis_type.clone(),
                frames_submitted: session.frames_submitted,
            })
            .await
        {
            Ok(report) => Some(report),
            Err(err) => {
                // Best effort: the session still completes cleanly.
                warn!(
                    "Final report unavailable for session {}: {err}",
                    session.session_id
                );
                None
            }
        };

        emit(
            &sink,
            ServerMessage::SessionComplete {
                session_id: session.session_id.clone(),
                report,
                timestamp: Utc::now(),
            },
        );
        info!(
            "Completed live analysis {} after {} frames",
            session.session_id, session.frames_submitted
        );
        Ok(())
    }

    /// Snapshot of the connection's current session, if any. Used by
    /// transports for introspection and by tests.
    pub async fn active_session(&self, connection: &ConnectionId) -> Option<LiveSession> {
        self.connections
            .lock()
            .await
            .get(connection)
            .and_then(|entry| entry.session.clone())
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

fn entry_mut<'a>(
    connections: &'a mut HashMap<ConnectionId, ConnectionEntry>,
    connection: &ConnectionId,
) -> EngineResult<&'a mut ConnectionEntry> {
    connections
        .get_mut(connection)
        .ok_or_else(|| EngineError::NotFound {
            resource: "Connection",
            id: connection.to_string(),
        })
}

fn emit(sink: &EventSink, message: ServerMessage) {
    if sink.send(message).is_err() {
        debug!("Dropped event for closed connection");
    }
}

fn emit_error(sink: &EventSink, err: &EngineError) {
    emit(
        sink,
        ServerMessage::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    );
}
