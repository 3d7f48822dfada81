use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use formsense::{
    AnalysisRequest, AnalysisVerdict, DrillRecommendation, EngineError, EngineResult,
    InferenceClient, ReportRequest, SessionReport,
};

pub fn temp_data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("formsense_test_{}", Uuid::new_v4()))
}

/// Inference gateway double: returns queued scores in order (default 75.0
/// once the queue is empty) and counts calls. Failure flags make the next
/// call of that kind error like an unreachable upstream.
pub struct StubGateway {
    pub analyze_calls: AtomicUsize,
    pub report_calls: AtomicUsize,
    scores: Mutex<VecDeque<f64>>,
    fail_next_analyze: AtomicBool,
    fail_reports: AtomicBool,
}

impl StubGateway {
    pub fn new() -> Self {
        Self {
            analyze_calls: AtomicUsize::new(0),
            report_calls: AtomicUsize::new(0),
            scores: Mutex::new(VecDeque::new()),
            fail_next_analyze: AtomicBool::new(false),
            fail_reports: AtomicBool::new(false),
        }
    }

    pub fn with_scores(scores: &[f64]) -> Self {
        let stub = Self::new();
        stub.scores.lock().unwrap().extend(scores.iter().copied());
        stub
    }

    pub fn fail_next_analyze(&self) {
        self.fail_next_analyze.store(true, Ordering::SeqCst);
    }

    pub fn fail_reports(&self) {
        self.fail_reports.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl InferenceClient for StubGateway {
    async fn analyze(&self, _request: AnalysisRequest) -> EngineResult<AnalysisVerdict> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_analyze.swap(false, Ordering::SeqCst) {
            return Err(EngineError::upstream("stub analyze failure"));
        }
        let score = self.scores.lock().unwrap().pop_front().unwrap_or(75.0);
        Ok(AnalysisVerdict {
            score,
            feedback: vec!["keep your elbow in".into()],
            metrics: Default::default(),
            timestamp: Utc::now(),
        })
    }

    async fn session_report(&self, request: ReportRequest) -> EngineResult<SessionReport> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reports.load(Ordering::SeqCst) {
            return Err(EngineError::upstream("stub report failure"));
        }
        Ok(SessionReport {
            overall_score: 75.0,
            summary: format!("{} frames analyzed", request.frames_submitted),
            strengths: vec!["footwork".into()],
            weak_areas: vec!["release timing".into()],
        })
    }

    async fn recommend_drills(
        &self,
        sport: &str,
        _skill_level: &str,
        weak_areas: &[String],
        _current_score: f64,
    ) -> EngineResult<Vec<DrillRecommendation>> {
        Ok(weak_areas
            .iter()
            .map(|area| DrillRecommendation {
                name: format!("{sport} {area} drill"),
                focus_area: area.clone(),
                description: "stub drill".into(),
                duration_minutes: Some(10),
            })
            .collect())
    }
}
