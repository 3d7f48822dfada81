use std::{path::Path, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::Utc;
use log::warn;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    db::Database,
    error::EngineResult,
    inference::{DrillRecommendation, HttpInferenceClient, InferenceClient},
    live::LiveSessionRegistry,
    models::RoomGeometry,
    room::RoomSessionCoordinator,
    safety::SafetyMonitor,
    settings::SettingsStore,
    trends::{self, PatternRecommendation, Trend},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Dependency-injection root wiring the coordination engine together. One
/// per process; transports borrow the registry/coordinator/monitor from
/// here.
pub struct Engine {
    settings: Arc<SettingsStore>,
    db: Database,
    gateway: Arc<dyn InferenceClient>,
    live: LiveSessionRegistry,
    rooms: RoomSessionCoordinator,
    safety: SafetyMonitor,
    reaper: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl Engine {
    /// Opens (or creates) the data directory, connects the production
    /// gateway from settings, and starts background maintenance.
    pub async fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
        let settings = SettingsStore::new(data_dir.join("settings.json"))?;

        let inference = settings.inference();
        let gateway: Arc<dyn InferenceClient> = Arc::new(
            HttpInferenceClient::new(
                inference.base_url,
                Duration::from_millis(inference.request_timeout_ms),
            )
            .context("failed to construct inference client")?,
        );

        Self::with_gateway(data_dir, settings, gateway).await
    }

    /// Same assembly with an injected gateway. Tests substitute stubs here.
    pub async fn with_gateway(
        data_dir: &Path,
        settings: SettingsStore,
        gateway: Arc<dyn InferenceClient>,
    ) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
        let db = Database::new(data_dir.join("formsense.sqlite3"))?;

        let rooms = RoomSessionCoordinator::new(db.clone());
        let safety = SafetyMonitor::new(db.clone(), rooms.locks());
        let live = LiveSessionRegistry::new(gateway.clone());

        let engine = Self {
            settings: Arc::new(settings),
            db,
            gateway,
            live,
            rooms,
            safety,
            reaper: Mutex::new(None),
        };

        // Sessions left open by a crash are reconciled before anything
        // else touches them.
        let recovered = engine.sweep_stale_sessions().await?;
        if recovered > 0 {
            warn!("Recovered {recovered} abandoned room sessions; marked as Failed");
        }

        engine.spawn_reaper().await;
        Ok(engine)
    }

    pub fn live(&self) -> &LiveSessionRegistry {
        &self.live
    }

    pub fn rooms(&self) -> &RoomSessionCoordinator {
        &self.rooms
    }

    pub fn safety(&self) -> &SafetyMonitor {
        &self.safety
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub async fn score_trend_for_user(&self, user_id: &str) -> EngineResult<Trend> {
        let history = self.rooms.completed_history(user_id).await?;
        Ok(trends::score_trend(&history))
    }

    pub async fn safety_trend_for_user(&self, user_id: &str) -> EngineResult<Trend> {
        let history = self.rooms.completed_history(user_id).await?;
        Ok(trends::safety_trend(&history))
    }

    pub fn recommend_room_patterns(
        &self,
        geometry: &RoomGeometry,
        sport: &str,
    ) -> EngineResult<PatternRecommendation> {
        // Only the footprint matters for the rules; area/aspect are ignored.
        for (value, field) in [(geometry.width, "width"), (geometry.height, "height")] {
            if !value.is_finite() || value <= 0.0 {
                return Err(crate::error::EngineError::validation_field(
                    format!("{field} must be positive, got {value}"),
                    field,
                ));
            }
        }
        Ok(trends::recommend_patterns(geometry, sport))
    }

    /// Gateway passthrough keyed by weak-performance areas.
    pub async fn recommend_drills(
        &self,
        sport: &str,
        skill_level: &str,
        weak_areas: &[String],
        current_score: f64,
    ) -> EngineResult<Vec<DrillRecommendation>> {
        self.gateway
            .recommend_drills(sport, skill_level, weak_areas, current_score)
            .await
    }

    /// Marks open sessions whose last sync predates the timeout as Failed.
    /// Shared by startup recovery and the reaper.
    async fn sweep_stale_sessions(&self) -> Result<usize> {
        let timeout = self.settings.room().session_timeout_secs;
        let cutoff = Utc::now() - chrono::Duration::seconds(timeout as i64);

        let candidates = self.db.list_stale_open_session_ids(cutoff).await?;
        let mut swept = 0usize;
        for session_id in candidates {
            // Re-checked under the session lock; a sync that landed since
            // the scan keeps the session alive.
            match self.rooms.fail_if_stale(&session_id, cutoff).await {
                Ok(true) => swept += 1,
                Ok(false) => {}
                Err(err) => log_warn!("Reaper skipped session {session_id}: {err}"),
            }
        }
        Ok(swept)
    }

    async fn spawn_reaper(&self) {
        let mut guard = self.reaper.lock().await;
        if let Some((token, handle)) = guard.take() {
            token.cancel();
            handle.abort();
        }

        let token = CancellationToken::new();
        let loop_token = token.clone();
        let db = self.db.clone();
        let rooms = self.rooms.clone();
        let settings = self.settings.clone();

        let handle = tokio::spawn(async move {
            let interval_secs = settings.room().reaper_interval_secs.max(1);
            let mut ticker = time::interval(Duration::from_secs(interval_secs));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let timeout = settings.room().session_timeout_secs;
                        let cutoff = Utc::now() - chrono::Duration::seconds(timeout as i64);

                        let candidates = match db.list_stale_open_session_ids(cutoff).await {
                            Ok(ids) => ids,
                            Err(err) => {
                                log_warn!("Reaper scan failed: {err}");
                                continue;
                            }
                        };

                        let mut swept = 0usize;
                        for session_id in candidates {
                            match rooms.fail_if_stale(&session_id, cutoff).await {
                                Ok(true) => swept += 1,
                                Ok(false) => {}
                                Err(err) => log_warn!("Reaper skipped session {session_id}: {err}"),
                            }
                        }
                        if swept > 0 {
                            log_info!("Reaper marked {swept} abandoned room sessions as Failed");
                        }
                    }
                    _ = loop_token.cancelled() => {
                        log_info!("Reaper shutting down");
                        break;
                    }
                }
            }
        });

        *guard = Some((token, handle));
    }

    /// Stops background maintenance. The database worker shuts down when
    /// the engine is dropped.
    pub async fn shutdown(&self) -> Result<()> {
        if let Some((token, handle)) = self.reaper.lock().await.take() {
            token.cancel();
            handle.await.context("reaper task failed to join")?;
        }
        Ok(())
    }
}
