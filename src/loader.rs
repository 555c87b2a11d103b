//! A file-backed `ProblemLoader` for the demo binary (§6 "Problem
//! loader interface"). Reads a JSON descriptor named `problem.json`
//! out of each problem's tool directory; a real deployment would
//! swap this for one backed by its own store, as §6.1 anticipates.

use async_trait::async_trait;
use horus::{LoadedProblem, ProblemLoader, SessionError};
use olympus_common::{Problem, RankPerformanceMap, RelativeResults, Standings};
use serde::Deserialize;
use std::path::PathBuf;

/// On-disk shape of `problem.json`, validated into the real
/// `Standings`/`RankPerformanceMap` types through their own
/// constructors rather than deserialized directly, so a malformed
/// descriptor is rejected at load time instead of at first use.
#[derive(Debug, Deserialize)]
struct ProblemDescriptor {
    problem: Problem,
    public_seeds: Vec<u64>,
    private_seeds: Vec<u64>,
    standings: Vec<(u64, i64)>,
    rank_performance_anchors: Vec<(f64, f64)>,
    relative_results: Option<RelativeResults>,
}

pub struct FileProblemLoader {
    root: PathBuf,
}

impl FileProblemLoader {
    pub fn new(root: PathBuf) -> Self {
        FileProblemLoader { root }
    }
}

#[async_trait]
impl ProblemLoader for FileProblemLoader {
    async fn load_problem(&self, problem_id: &str, _lite: bool) -> Result<LoadedProblem, SessionError> {
        let path = self.root.join(problem_id).join("problem.json");
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SessionError::InvalidArgument(format!("cannot read `{}`: {e}", path.display())))?;
        let descriptor: ProblemDescriptor = serde_json::from_str(&raw)
            .map_err(|e| SessionError::InvalidArgument(format!("malformed `{}`: {e}", path.display())))?;

        let standings = Standings::new(descriptor.standings).map_err(SessionError::InvalidArgument)?;
        let rank_performance_map = RankPerformanceMap::new(descriptor.rank_performance_anchors)
            .map_err(SessionError::InvalidArgument)?;

        Ok(LoadedProblem {
            problem: descriptor.problem,
            public_seeds: descriptor.public_seeds,
            private_seeds: descriptor.private_seeds,
            standings,
            rank_performance_map,
            relative_results: descriptor.relative_results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn rejects_missing_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileProblemLoader::new(dir.path().to_path_buf());
        assert!(loader.load_problem("missing", false).await.is_err());
    }

    #[tokio::test]
    async fn loads_a_well_formed_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let problem_dir = dir.path().join("p1");
        std::fs::create_dir_all(&problem_dir).unwrap();
        let now = Utc::now();
        let descriptor = serde_json::json!({
            "problem": {
                "problem_id": "p1",
                "problem_type": "BATCH",
                "score_type": "MAXIMIZE",
                "time_limit_seconds": 2.0,
                "memory_limit_bytes": 256 * 1024 * 1024,
                "tool_dir": problem_dir.to_string_lossy(),
                "start_at": now.to_rfc3339(),
                "end_at": (now + chrono::Duration::hours(2)).to_rfc3339(),
                "lenient_public_scoring": false,
                "visualisation_known_empty": false,
            },
            "public_seeds": [1, 2, 3],
            "private_seeds": [4, 5, 6],
            "standings": [[1, 100], [2, 0]],
            "rank_performance_anchors": [[1.0, 3000.0], [2.0, 1000.0]],
            "relative_results": null,
        });
        std::fs::write(problem_dir.join("problem.json"), descriptor.to_string()).unwrap();

        let loader = FileProblemLoader::new(dir.path().to_path_buf());
        let loaded = loader.load_problem("p1", false).await.unwrap();
        assert_eq!(loaded.public_seeds, vec![1, 2, 3]);
        assert_eq!(loaded.problem.problem_id, "p1");
    }
}
