mod geometry;
mod incident;
mod live;
mod metric;
mod room_session;

pub use geometry::{CalibrationData, RoomGeometry, Vec3};
pub use incident::{IncidentKind, IncidentReport, IncidentSeverity, SafetyIncident};
pub use live::LiveSession;
pub use metric::{MetricSample, PerformanceMetricSnapshot};
pub use room_session::{
    LightingConditions, Platform, RoomSession, RoomSessionSpec, RoomSessionStatus,
};
