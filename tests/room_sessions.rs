mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{temp_data_dir, StubGateway};
use formsense::{
    CalibrationData, Engine, IncidentKind, IncidentReport, IncidentSeverity, LightingConditions,
    MetricSample, Platform, RoomGeometry, RoomSessionSpec, RoomSessionStatus, RoomSessionUpdate,
    RoomSettings, SettingsStore, Trend, Vec3,
};

async fn engine() -> Engine {
    let dir = temp_data_dir();
    let settings = SettingsStore::new(dir.join("settings.json")).unwrap();
    Engine::with_gateway(&dir, settings, Arc::new(StubGateway::new()))
        .await
        .unwrap()
}

fn spec(user: &str, platform: Platform) -> RoomSessionSpec {
    RoomSessionSpec {
        user_id: user.into(),
        sport: "basketball".into(),
        difficulty: "intermediate".into(),
        drill_pattern: "dribble_box".into(),
        geometry: RoomGeometry {
            width: 3.0,
            height: 3.0,
            area: 9.0,
            ceiling_height: Some(2.9),
            is_flat: true,
            aspect_ratio: 1.0,
        },
        calibration: CalibrationData::default(),
        safety_score: 95.0,
        obstacle_count: 1,
        lighting_conditions: Some(LightingConditions::Normal),
        reflective_surfaces: false,
        platform,
        average_fps: 30.0,
        tracking_quality: 0.8,
    }
}

fn warning_report() -> IncidentReport {
    IncidentReport {
        kind: IncidentKind::WallProximity,
        severity: IncidentSeverity::Warning,
        message: "user within 0.3m of wall".into(),
        user_position: Some(Vec3 {
            x: 1.4,
            y: 0.0,
            z: 0.2,
        }),
    }
}

fn critical_report() -> IncidentReport {
    IncidentReport {
        kind: IncidentKind::CollisionRisk,
        severity: IncidentSeverity::Critical,
        message: "imminent collision with obstacle".into(),
        user_position: None,
    }
}

#[tokio::test]
async fn create_then_status_round_trips() {
    let engine = engine().await;
    let created = engine
        .rooms()
        .create_session(spec("user-1", Platform::Web))
        .await
        .unwrap();

    assert_eq!(created.status, RoomSessionStatus::Active);
    assert_eq!(created.safety_score, 95.0);

    let status = engine.rooms().get_sync_status(&created.id).await.unwrap();
    assert!(status.is_consistent);
    assert!(status.incidents.is_empty());
    assert!(status.metrics.is_empty());
    assert_eq!(
        serde_json::to_value(&status.session).unwrap(),
        serde_json::to_value(&created).unwrap()
    );

    // Reads without intervening writes are identical.
    let again = engine.rooms().get_sync_status(&created.id).await.unwrap();
    assert_eq!(
        serde_json::to_value(&status).unwrap(),
        serde_json::to_value(&again).unwrap()
    );

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn sync_applies_field_level_merge() {
    let engine = engine().await;
    let created = engine
        .rooms()
        .create_session(spec("user-1", Platform::Web))
        .await
        .unwrap();

    // A weaker platform reports in: quality metrics must not regress, the
    // safety score and environment must follow the latest observation.
    let synced = engine
        .rooms()
        .sync_session(
            &created.id,
            Platform::NativeAr,
            RoomSessionUpdate {
                average_fps: Some(22.0),
                tracking_quality: Some(0.6),
                safety_score: Some(55.0),
                obstacle_count: Some(3),
                reflective_surfaces: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(synced.average_fps, 30.0);
    assert_eq!(synced.tracking_quality, 0.8);
    assert_eq!(synced.safety_score, 55.0);
    assert_eq!(synced.obstacle_count, 3);
    assert!(synced.reflective_surfaces);
    assert_eq!(synced.platform, Platform::NativeAr);
    assert!(synced.updated_at >= created.updated_at);

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn concurrent_syncs_settle_on_max_fps() {
    let engine = engine().await;
    let created = engine
        .rooms()
        .create_session(spec("user-1", Platform::Web))
        .await
        .unwrap();

    let fps_values = [24.0, 31.0, 58.0, 12.0, 45.0, 60.0, 19.0, 33.0];
    let mut handles = Vec::new();
    for (i, fps) in fps_values.into_iter().enumerate() {
        let rooms = engine.rooms().clone();
        let session_id = created.id.clone();
        let platform = if i % 2 == 0 {
            Platform::Web
        } else {
            Platform::NativeAr
        };
        handles.push(tokio::spawn(async move {
            rooms
                .sync_session(
                    &session_id,
                    platform,
                    RoomSessionUpdate {
                        average_fps: Some(fps),
                        ..Default::default()
                    },
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let status = engine.rooms().get_sync_status(&created.id).await.unwrap();
    assert_eq!(status.session.average_fps, 60.0);

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let engine = engine().await;

    let err = engine
        .rooms()
        .sync_session("missing", Platform::Web, RoomSessionUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");

    let err = engine
        .safety()
        .log_incident("missing", warning_report())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn first_critical_incident_pauses_exactly_once() {
    let engine = engine().await;
    let created = engine
        .rooms()
        .create_session(spec("user-1", Platform::NativeAr))
        .await
        .unwrap();

    // Warnings are recorded but never transition.
    engine
        .safety()
        .log_incident(&created.id, warning_report())
        .await
        .unwrap();
    let status = engine.rooms().get_sync_status(&created.id).await.unwrap();
    assert_eq!(status.session.status, RoomSessionStatus::Active);
    assert_eq!(status.session.total_safety_incidents, 1);
    assert_eq!(
        status.session.last_incident_severity,
        Some(IncidentSeverity::Warning)
    );

    let first = engine
        .safety()
        .log_incident(&created.id, critical_report())
        .await
        .unwrap();
    assert!(first.auto_paused);

    let second = engine
        .safety()
        .log_incident(&created.id, critical_report())
        .await
        .unwrap();
    assert!(!second.auto_paused);

    let status = engine.rooms().get_sync_status(&created.id).await.unwrap();
    assert_eq!(status.session.status, RoomSessionStatus::Paused);
    assert_eq!(status.session.total_safety_incidents, 3);
    let auto_paused: Vec<_> = status
        .incidents
        .iter()
        .filter(|incident| incident.auto_paused)
        .collect();
    assert_eq!(auto_paused.len(), 1);

    // Telemetry keeps flowing while paused.
    engine
        .rooms()
        .sync_session(
            &created.id,
            Platform::Web,
            RoomSessionUpdate {
                safety_score: Some(70.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Resume is its own explicit operation.
    let resumed = engine.rooms().resume_session(&created.id).await.unwrap();
    assert_eq!(resumed.status, RoomSessionStatus::Active);

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn malformed_incident_has_no_side_effects() {
    let engine = engine().await;
    let created = engine
        .rooms()
        .create_session(spec("user-1", Platform::Web))
        .await
        .unwrap();

    let mut report = critical_report();
    report.message = "   ".into();
    let err = engine
        .safety()
        .log_incident(&created.id, report)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "validation_error");

    let status = engine.rooms().get_sync_status(&created.id).await.unwrap();
    assert_eq!(status.session.status, RoomSessionStatus::Active);
    assert_eq!(status.session.total_safety_incidents, 0);
    assert!(status.incidents.is_empty());

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn terminal_sessions_reject_writes() {
    let engine = engine().await;
    let created = engine
        .rooms()
        .create_session(spec("user-1", Platform::Web))
        .await
        .unwrap();

    let completed = engine
        .rooms()
        .complete_session(&created.id, 82.0)
        .await
        .unwrap();
    assert_eq!(completed.status, RoomSessionStatus::Completed);
    assert_eq!(completed.total_score, Some(82.0));
    assert!(completed.completed_at.is_some());

    let err = engine
        .rooms()
        .sync_session(&created.id, Platform::Web, RoomSessionUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "validation_error");

    let err = engine.rooms().resume_session(&created.id).await.unwrap_err();
    assert_eq!(err.code(), "validation_error");

    let err = engine
        .rooms()
        .complete_session(&created.id, 90.0)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "validation_error");

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn metric_snapshots_append_in_order() {
    let engine = engine().await;
    let created = engine
        .rooms()
        .create_session(spec("user-1", Platform::Web))
        .await
        .unwrap();

    for score in [0.5, 0.7] {
        engine
            .rooms()
            .record_metrics(
                &created.id,
                MetricSample {
                    adaptation_score: score,
                    space_utilization_score: 0.6,
                    safety_compliance_score: 0.9,
                },
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let status = engine.rooms().get_sync_status(&created.id).await.unwrap();
    assert_eq!(status.metrics.len(), 2);
    assert_eq!(status.metrics[0].adaptation_score, 0.5);
    assert_eq!(status.metrics[1].adaptation_score, 0.7);

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn user_sessions_are_grouped_by_platform() {
    let engine = engine().await;
    engine
        .rooms()
        .create_session(spec("user-1", Platform::Web))
        .await
        .unwrap();
    engine
        .rooms()
        .create_session(spec("user-1", Platform::NativeAr))
        .await
        .unwrap();
    engine
        .rooms()
        .create_session(spec("user-2", Platform::Web))
        .await
        .unwrap();

    let sessions = engine.rooms().get_sessions_for_user("user-1").await.unwrap();
    assert_eq!(sessions.sessions.len(), 2);
    assert_eq!(sessions.by_platform[&Platform::Web].len(), 1);
    assert_eq!(sessions.by_platform[&Platform::NativeAr].len(), 1);

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn trends_read_completed_history() {
    let engine = engine().await;
    let rooms = engine.rooms();

    let older = rooms
        .create_session(spec("trend-user", Platform::Web))
        .await
        .unwrap();
    rooms.complete_session(&older.id, 80.0).await.unwrap();
    tokio::time::sleep(Duration::from_millis(15)).await;

    let recent = rooms
        .create_session(spec("trend-user", Platform::Web))
        .await
        .unwrap();
    engine
        .safety()
        .log_incident(&recent.id, warning_report())
        .await
        .unwrap();
    rooms.complete_session(&recent.id, 89.0).await.unwrap();

    // 89 > 80 * 1.1, and the recent bucket picked up an incident where the
    // older one had none.
    assert_eq!(
        engine.score_trend_for_user("trend-user").await.unwrap(),
        Trend::Improving
    );
    assert_eq!(
        engine.safety_trend_for_user("trend-user").await.unwrap(),
        Trend::Declining
    );
    assert_eq!(
        engine.score_trend_for_user("nobody").await.unwrap(),
        Trend::InsufficientData
    );

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn startup_recovery_fails_abandoned_sessions() {
    let dir = temp_data_dir();

    let settings = SettingsStore::new(dir.join("settings.json")).unwrap();
    let first = Engine::with_gateway(&dir, settings, Arc::new(StubGateway::new()))
        .await
        .unwrap();
    let session = first
        .rooms()
        .create_session(spec("user-1", Platform::Web))
        .await
        .unwrap();
    first.shutdown().await.unwrap();
    drop(first);

    // Shrink the abandonment horizon to zero, then restart over the same
    // data directory.
    let tweak = SettingsStore::new(dir.join("settings.json")).unwrap();
    tweak
        .update_room(RoomSettings {
            session_timeout_secs: 0,
            reaper_interval_secs: 3600,
        })
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let second = Engine::with_gateway(
        &dir,
        SettingsStore::new(dir.join("settings.json")).unwrap(),
        Arc::new(StubGateway::new()),
    )
    .await
    .unwrap();

    let status = second.rooms().get_sync_status(&session.id).await.unwrap();
    assert_eq!(status.session.status, RoomSessionStatus::Failed);

    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn invalid_geometry_is_rejected() {
    let engine = engine().await;

    let mut bad = spec("user-1", Platform::Web);
    bad.geometry.width = 0.0;
    let err = engine.rooms().create_session(bad).await.unwrap_err();
    assert_eq!(err.code(), "validation_error");

    let mut bad = spec("user-1", Platform::Web);
    bad.geometry.area = -2.0;
    assert!(engine.rooms().create_session(bad).await.is_err());

    engine.shutdown().await.unwrap();
}
