//! Session bound and construction (§4.F.1).

use std::collections::HashMap;
use std::sync::Arc;

use sisyphus::Backend;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::SessionError;
use crate::loader::ProblemLoader;
use crate::session::{Session, SessionConfig};

pub type SessionId = Uuid;

/// A `MAX_SESSIONS`-bounded map of live sessions. `start_session`
/// builds a session's public/private inputs up front and registers
/// nothing at all if either generation step fails (§7 "Fatal errors").
pub struct SessionRegistry {
    max_sessions: usize,
    sessions: Mutex<HashMap<SessionId, Arc<Session>>>,
    loader: Arc<dyn ProblemLoader>,
    backend: Arc<dyn Backend>,
    config: SessionConfig,
}

impl SessionRegistry {
    pub fn new(
        max_sessions: usize,
        loader: Arc<dyn ProblemLoader>,
        backend: Arc<dyn Backend>,
        config: SessionConfig,
    ) -> Self {
        SessionRegistry {
            max_sessions,
            sessions: Mutex::new(HashMap::new()),
            loader,
            backend,
            config,
        }
    }

    /// Loads the problem, generates public and private inputs from
    /// their seed lists, and registers a new `Session` under a fresh
    /// id. Fails the whole construction — no session is registered —
    /// if the registry is full or either generation step fails.
    pub async fn start_session(
        &self,
        problem_id: &str,
        lite: bool,
        maximum_resource_usage: olympus_common::ResourceUsage,
    ) -> Result<SessionId, SessionError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.len() >= self.max_sessions {
            return Err(SessionError::Internal(format!(
                "session registry is full ({} sessions active)",
                self.max_sessions
            )));
        }

        let loaded = self.loader.load_problem(problem_id, lite).await?;
        let tool_dir = loaded.problem.tool_dir.to_string_lossy().to_string();

        let public_inputs = minos::generate_inputs(
            &loaded.public_seeds,
            &Default::default(),
            &tool_dir,
            &self.backend,
            self.config.generation_timeout_secs,
        )
        .await?;
        let private_inputs = minos::generate_inputs(
            &loaded.private_seeds,
            &Default::default(),
            &tool_dir,
            &self.backend,
            self.config.generation_timeout_secs,
        )
        .await?;

        let id = Uuid::new_v4();
        let session = Session::new(
            loaded,
            lite,
            public_inputs,
            private_inputs,
            tool_dir,
            maximum_resource_usage,
            self.config.clone(),
            Arc::clone(&self.backend),
        );
        sessions.insert(id, Arc::new(session));
        Ok(id)
    }

    pub async fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.lock().await.get(&id).cloned()
    }

    /// Closes and drops a session, releasing its backend-held state.
    pub async fn end_session(&self, id: SessionId) -> Result<(), SessionError> {
        let session = self.sessions.lock().await.remove(&id);
        match session {
            Some(session) => session.close().await,
            None => Err(SessionError::InvalidArgument(format!("unknown session `{id}`"))),
        }
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{FixtureLoader, LoadedProblem};
    use chrono::{Duration, Utc};
    use olympus_common::{Problem, ProblemType, RankPerformanceMap, ScoreType, Standings};
    use sisyphus::{Config as BackendConfig, LocalBackend};
    use std::path::PathBuf;

    fn sample_loaded(tool_dir: PathBuf) -> LoadedProblem {
        let now = Utc::now();
        LoadedProblem {
            problem: Problem {
                problem_id: "p1".to_string(),
                problem_type: ProblemType::Batch,
                score_type: ScoreType::Maximize,
                time_limit_seconds: 2.0,
                memory_limit_bytes: 256 * 1024 * 1024,
                tool_dir,
                start_at: now,
                end_at: now + Duration::hours(2),
                lenient_public_scoring: false,
                visualisation_known_empty: false,
            },
            public_seeds: vec![],
            private_seeds: vec![],
            standings: Standings::new(vec![(1, 100), (2, 0)]).unwrap(),
            rank_performance_map: RankPerformanceMap::new(vec![(1.0, 3000.0), (2.0, 1000.0)]).unwrap(),
            relative_results: None,
        }
    }

    fn sample_config() -> SessionConfig {
        SessionConfig {
            session_duration: Duration::hours(1),
            use_same_time_scale: false,
            num_workers: 1,
            max_memory_limit_bytes: 1 << 30,
            compile_timeout_secs: 5,
            generation_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn start_session_registers_with_empty_seed_lists() {
        let dir = tempfile::tempdir().unwrap();
        let loader = Arc::new(FixtureLoader::new().with_problem(sample_loaded(dir.path().to_path_buf())));
        let backend: Arc<dyn Backend> = Arc::new(LocalBackend::new(BackendConfig {
            judge_dir: dir.path().join("judge").to_string_lossy().to_string(),
            work_dir: dir.path().join("work").to_string_lossy().to_string(),
            compile_timeout_secs: 5,
            generation_timeout_secs: 5,
            container_images: Default::default(),
            max_memory_bytes: 1 << 30,
            docker_api_version: None,
            docker_host: None,
        }));
        let registry = SessionRegistry::new(4, loader, backend, sample_config());
        let id = registry
            .start_session("p1", false, olympus_common::ResourceUsage {
                num_case_gen: 100,
                num_case_eval: 100,
                execution_time_case_eval: 1000.0,
                num_call_public_eval: 10,
                num_call_private_eval: 1,
            })
            .await
            .unwrap();
        assert!(registry.get(id).await.is_some());
        assert_eq!(registry.active_count().await, 1);
    }

    #[tokio::test]
    async fn start_session_fails_for_unknown_problem_and_registers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let loader = Arc::new(FixtureLoader::new());
        let backend: Arc<dyn Backend> = Arc::new(LocalBackend::new(BackendConfig {
            judge_dir: dir.path().join("judge").to_string_lossy().to_string(),
            work_dir: dir.path().join("work").to_string_lossy().to_string(),
            compile_timeout_secs: 5,
            generation_timeout_secs: 5,
            container_images: Default::default(),
            max_memory_bytes: 1 << 30,
            docker_api_version: None,
            docker_host: None,
        }));
        let registry = SessionRegistry::new(4, loader, backend, sample_config());
        assert!(registry.start_session("missing", false, olympus_common::ResourceUsage::ZERO).await.is_err());
        assert_eq!(registry.active_count().await, 0);
    }
}
