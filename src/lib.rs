mod db;
mod engine;
mod error;
mod inference;
mod live;
mod models;
mod room;
mod safety;
mod settings;
mod trends;
mod utils;

pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use inference::{
    AnalysisRequest, AnalysisVerdict, DrillRecommendation, HttpInferenceClient, InferenceClient,
    ReportRequest, SessionReport,
};
pub use live::{ClientMessage, ConnectionId, EventSink, LiveSessionRegistry, ServerMessage};
pub use models::{
    CalibrationData, IncidentKind, IncidentReport, IncidentSeverity, LightingConditions,
    LiveSession, MetricSample, PerformanceMetricSnapshot, Platform, RoomGeometry, RoomSession,
    RoomSessionSpec, RoomSessionStatus, SafetyIncident, Vec3,
};
pub use room::{RoomSessionCoordinator, RoomSessionUpdate, SyncStatus, UserSessions};
pub use safety::SafetyMonitor;
pub use settings::{InferenceSettings, RoomSettings, SettingsStore};
pub use trends::{
    recommend_patterns, safety_trend, score_trend, Adaptations, DrillPattern,
    PatternRecommendation, Trend, CONFINED_SPACE_WARNING, INSUFFICIENT_CLEARANCE_WARNING,
    LOW_CEILING_WARNING,
};

/// Initialize logging from `RUST_LOG` with an info-level default. Embedders
/// call this once at startup; repeated calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
