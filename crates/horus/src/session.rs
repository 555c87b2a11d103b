//! The Session State Machine (§4.F): the live context a benchmarking
//! run is driven through, one action at a time, under a resource
//! budget and a wall-clock duration.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use olympus_common::{
    resource::ResourceField, CaseResult, EvaluationResult, Language, Problem, RankPerformanceMap,
    RelativeResults, ResourceUsage, Standings,
};
use sisyphus::Backend;
use tokio::sync::Mutex;

use crate::error::SessionError;
use crate::loader::LoadedProblem;
use crate::validation::{
    parse_memory_limit, resolve_language, validate_run_cases_arguments, ValidationContext,
};

/// Knobs the registry threads through to every `Session` it builds
/// (§4.F.1, §6.1 environment variables).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub session_duration: Duration,
    pub use_same_time_scale: bool,
    pub num_workers: usize,
    pub max_memory_limit_bytes: u64,
    pub compile_timeout_secs: u64,
    pub generation_timeout_secs: u64,
}

/// User-facing arguments accepted by the run-cases-shaped actions
/// (`code_run`, `case_eval`, `case_gen_eval`, `public_eval`,
/// `private_eval` thread a subset of these). `None` defers to the
/// problem's own limit, as in `_check_run_cases_arguments`.
#[derive(Debug, Clone)]
pub struct RunCasesArgs {
    pub code: String,
    pub language: String,
    pub judge_version: Option<String>,
    pub time_limit: Option<f64>,
    pub memory_limit: Option<String>,
}

struct ResolvedArgs {
    code: String,
    language: Language,
    time_limit: f64,
    memory_limit: u64,
}

/// Mutable bookkeeping guarded behind one lock so a budget check and
/// its subsequent update happen atomically (§4.F "Resource budget").
struct MutableState {
    current_resource_usage: ResourceUsage,
    last_public_eval_time: Option<DateTime<Utc>>,
    last_private_eval_time: Option<DateTime<Utc>>,
    private_eval_called: bool,
    action_log: Vec<String>,
}

/// The live context for one benchmarking run (§3 "Session").
pub struct Session {
    problem: Problem,
    lite_version: bool,
    public_inputs: Vec<String>,
    private_inputs: Vec<String>,
    public_seeds: Vec<u64>,
    private_seeds: Vec<u64>,
    standings: Standings,
    rank_performance_map: RankPerformanceMap,
    relative_results: Option<RelativeResults>,
    tool_dir: String,
    maximum_resource_usage: ResourceUsage,
    session_duration: Duration,
    session_started_at: DateTime<Utc>,
    use_same_time_scale: bool,
    num_workers: usize,
    max_memory_limit_bytes: u64,
    compile_timeout_secs: u64,
    generation_timeout_secs: u64,
    /// Visualization server port, persisted opaquely (§4.F "Snapshot");
    /// no server lifecycle is driven from it.
    port: Option<u16>,
    backend: Arc<dyn Backend>,
    state: Mutex<MutableState>,
}

impl Session {
    pub fn new(
        loaded: LoadedProblem,
        lite_version: bool,
        public_inputs: Vec<String>,
        private_inputs: Vec<String>,
        tool_dir: String,
        maximum_resource_usage: ResourceUsage,
        config: SessionConfig,
        backend: Arc<dyn Backend>,
    ) -> Self {
        Session::new_with_port(
            loaded,
            lite_version,
            public_inputs,
            private_inputs,
            tool_dir,
            maximum_resource_usage,
            config,
            backend,
            None,
        )
    }

    /// As [`Session::new`], but also records the port a visualization
    /// server would run on, so it survives a `save`/`load` round trip.
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_port(
        loaded: LoadedProblem,
        lite_version: bool,
        public_inputs: Vec<String>,
        private_inputs: Vec<String>,
        tool_dir: String,
        maximum_resource_usage: ResourceUsage,
        config: SessionConfig,
        backend: Arc<dyn Backend>,
        port: Option<u16>,
    ) -> Self {
        Session {
            problem: loaded.problem,
            lite_version,
            public_inputs,
            private_inputs,
            public_seeds: loaded.public_seeds,
            private_seeds: loaded.private_seeds,
            standings: loaded.standings,
            rank_performance_map: loaded.rank_performance_map,
            relative_results: loaded.relative_results,
            tool_dir,
            maximum_resource_usage,
            session_duration: config.session_duration,
            session_started_at: Utc::now(),
            use_same_time_scale: config.use_same_time_scale,
            num_workers: config.num_workers,
            max_memory_limit_bytes: config.max_memory_limit_bytes,
            compile_timeout_secs: config.compile_timeout_secs,
            generation_timeout_secs: config.generation_timeout_secs,
            port,
            backend,
            state: Mutex::new(MutableState {
                current_resource_usage: ResourceUsage::ZERO,
                last_public_eval_time: None,
                last_private_eval_time: None,
                private_eval_called: false,
                action_log: Vec::new(),
            }),
        }
    }

    // ── Guards (§4.F) ────────────────────────────────────────────────

    /// Liveness + resource-budget + submission-interval guard, run
    /// before an action starts. `private_eval` is the one action that
    /// bypasses the elapsed-time half of liveness — it is still gated
    /// by having never run before (its own budget caps it at once).
    async fn guard_before(
        &self,
        action: &'static str,
        state: &MutableState,
        fields: &[ResourceField],
    ) -> Result<(), SessionError> {
        if state.private_eval_called {
            return Err(SessionError::SessionFinished);
        }
        let time_expired = Utc::now() >= self.session_started_at + self.session_duration;
        if action != "private_eval" && time_expired {
            return Err(SessionError::SessionFinished);
        }
        if !state.current_resource_usage.lt_on(&self.maximum_resource_usage, fields) {
            return Err(SessionError::BudgetExceeded { action });
        }
        if action == "public_eval" && self.use_same_time_scale {
            if let Some(last) = state.last_public_eval_time {
                let interval = Duration::seconds(self.problem.submission_interval_seconds());
                if Utc::now() < last + interval {
                    return Err(SessionError::SubmissionIntervalViolation { action });
                }
            }
        }
        Ok(())
    }

    fn guard_after(
        &self,
        action: &'static str,
        state: &MutableState,
    ) -> Result<(), SessionError> {
        if !state.current_resource_usage.le(&self.maximum_resource_usage) {
            return Err(SessionError::BudgetExceeded { action });
        }
        Ok(())
    }

    fn elapsed_seconds(&self) -> f64 {
        (Utc::now() - self.session_started_at).num_milliseconds() as f64 / 1000.0
    }

    fn log(&self, state: &mut MutableState, function: &str, arguments: serde_json::Value) {
        let elapsed_time = self.elapsed_seconds();
        let entry = serde_json::json!({
            "function": function,
            "arguments": arguments,
            "elapsed_time": elapsed_time,
        });
        state.action_log.push(entry.to_string());
    }

    /// Resolve and validate a run-cases-shaped argument bundle against
    /// this session's own defaults (§4.F "Argument validation").
    async fn resolve_run_cases_args(
        &self,
        args: &RunCasesArgs,
        allow_empty_code: bool,
    ) -> Result<ResolvedArgs, SessionError> {
        let version = args.judge_version.clone().unwrap_or_else(crate::validation::default_version);
        let (language, standard_hint) =
            resolve_language(&args.language).map_err(SessionError::InvalidArgument)?;
        let toolchain_version = olympus_common::ToolchainVersion(version);
        let version_rejected = toolchain_version.rejects_cpp_standard(language, &standard_hint);

        let time_limit = args.time_limit.unwrap_or(self.problem.time_limit_seconds);
        let memory_limit = match &args.memory_limit {
            Some(raw) => parse_memory_limit(raw, self.max_memory_limit_bytes)
                .map_err(SessionError::InvalidArgument)?,
            None => self.problem.memory_limit_bytes.min(self.max_memory_limit_bytes),
        };

        let code_bytes = if allow_empty_code { 1 } else { args.code.len() };
        let ctx = ValidationContext {
            code_bytes,
            language_known: true,
            version_rejected,
            time_limit,
            memory_limit_bytes: memory_limit,
        };
        validate_run_cases_arguments(&ctx).await.map_err(SessionError::InvalidArgument)?;

        Ok(ResolvedArgs {
            code: args.code.clone(),
            language,
            time_limit,
            memory_limit,
        })
    }

    // ── Actions (§4.F) ───────────────────────────────────────────────

    /// Compile-and-run without judging; only execution time is
    /// accounted (§4.F "code_run").
    pub async fn code_run(
        &self,
        input: String,
        args: RunCasesArgs,
    ) -> Result<minos::CodeRunOutcome, SessionError> {
        let mut state = self.state.lock().await;
        self.guard_before("code_run", &state, &[ResourceField::ExecutionTimeCaseEval]).await?;
        let resolved = self.resolve_run_cases_args(&args, true).await?;

        let outcome = minos::run_code(minos::CodeRunRequest {
            input: input.clone(),
            code: resolved.code.clone(),
            language: resolved.language,
            time_limit: resolved.time_limit,
            memory_limit: resolved.memory_limit,
            tool_dir: self.tool_dir.clone(),
            backend: Arc::clone(&self.backend),
            compile_timeout_secs: self.compile_timeout_secs,
        })
        .await?;

        state.current_resource_usage.execution_time_case_eval += outcome.execution_time;
        self.guard_after("code_run", &state)?;
        self.log(
            &mut state,
            "code_run",
            serde_json::json!({"input": input, "language": args.language, "time_limit": resolved.time_limit}),
        );
        Ok(outcome)
    }

    /// Generate inputs from seeds (§4.F "case_gen").
    pub async fn case_gen(
        &self,
        seeds: Vec<u64>,
        gen_kwargs: std::collections::BTreeMap<String, String>,
    ) -> Result<Vec<String>, SessionError> {
        let gen_kwargs = crate::validation::sanitise_gen_kwargs(gen_kwargs);
        let mut state = self.state.lock().await;
        self.guard_before("case_gen", &state, &[ResourceField::NumCaseGen]).await?;

        let inputs = minos::generate_inputs(
            &seeds,
            &gen_kwargs,
            &self.tool_dir,
            &self.backend,
            self.generation_timeout_secs,
        )
        .await?;
        if inputs.len() != seeds.len() {
            return Err(SessionError::Internal(
                "the number of generated cases must match the number of seeds provided".to_string(),
            ));
        }

        state.current_resource_usage.num_case_gen += inputs.len() as u64;
        self.guard_after("case_gen", &state)?;
        self.log(&mut state, "case_gen", serde_json::json!({"seeds": seeds}));
        Ok(inputs)
    }

    /// Judge given inputs against submitted code, always summing scores
    /// regardless of verdict (§4.F "case_eval").
    pub async fn case_eval(
        &self,
        inputs: Vec<String>,
        args: RunCasesArgs,
        skip_visualisation: bool,
    ) -> Result<EvaluationResult, SessionError> {
        let mut state = self.state.lock().await;
        self.guard_before(
            "case_eval",
            &state,
            &[ResourceField::NumCaseEval, ResourceField::ExecutionTimeCaseEval],
        )
        .await?;
        let resolved = self.resolve_run_cases_args(&args, false).await?;

        let case_results = minos::run_cases(minos::RunCasesRequest {
            inputs: inputs.clone(),
            code: resolved.code,
            language: resolved.language,
            time_limit: resolved.time_limit,
            memory_limit: resolved.memory_limit,
            problem_type: self.problem.problem_type,
            tool_dir: self.tool_dir.clone(),
            return_details: true,
            skip_visualisation,
            num_workers: self.num_workers,
            backend: Arc::clone(&self.backend),
            compile_timeout_secs: self.compile_timeout_secs,
        })
        .await?;
        if case_results.len() != inputs.len() {
            return Err(SessionError::Internal(
                "the number of case results must equal the number of inputs".to_string(),
            ));
        }

        let delta = ResourceUsage {
            num_case_eval: case_results.len() as u64,
            execution_time_case_eval: case_results.iter().map(|c| c.execution_time).sum(),
            ..ResourceUsage::ZERO
        };
        state.current_resource_usage = state.current_resource_usage + delta;
        self.guard_after("case_eval", &state)?;
        self.log(&mut state, "case_eval", serde_json::json!({"language": args.language}));
        Ok(EvaluationResult { case_results, resource_usage: delta })
    }

    /// Generate then judge under one combined pre-guard, so a refusal
    /// on either half is detected before any generation work starts
    /// (§4.F "case_gen_eval").
    pub async fn case_gen_eval(
        &self,
        seeds: Vec<u64>,
        gen_kwargs: std::collections::BTreeMap<String, String>,
        args: RunCasesArgs,
        skip_visualisation: bool,
    ) -> Result<EvaluationResult, SessionError> {
        {
            let state = self.state.lock().await;
            self.guard_before(
                "case_gen_eval",
                &state,
                &[
                    ResourceField::NumCaseGen,
                    ResourceField::NumCaseEval,
                    ResourceField::ExecutionTimeCaseEval,
                ],
            )
            .await?;
        }
        let inputs = self.case_gen(seeds, gen_kwargs).await?;
        let result = self.case_eval(inputs, args, skip_visualisation).await?;
        let state = self.state.lock().await;
        self.guard_after("case_gen_eval", &state)?;
        Ok(result)
    }

    /// Thin pass-through to the visualiser for already-produced
    /// input/output pairs; not budget-guarded, only liveness-guarded
    /// (§4.F "local_visualization").
    pub async fn local_visualization(
        &self,
        inputs: Vec<String>,
        outputs: Vec<String>,
    ) -> Result<Vec<Option<olympus_common::Visualisation>>, SessionError> {
        {
            let state = self.state.lock().await;
            if state.private_eval_called
                || Utc::now() >= self.session_started_at + self.session_duration
            {
                return Err(SessionError::SessionFinished);
            }
        }
        if inputs.len() != outputs.len() {
            return Err(SessionError::InvalidArgument(
                "`inputs` and `outputs` must be the same length".to_string(),
            ));
        }

        let mut images = Vec::with_capacity(inputs.len());
        for (input, output) in inputs.iter().zip(outputs.iter()) {
            let case_dir = format!("{}/local_vis_{:x}", self.tool_dir, crc32(input));
            self.backend.mkdir(&case_dir).await.map_err(minos::JudgeError::from)?;
            self.backend
                .write_file(&format!("{case_dir}/input.txt"), input.as_bytes())
                .await
                .map_err(minos::JudgeError::from)?;
            self.backend
                .write_file(&format!("{case_dir}/output.txt"), output.as_bytes())
                .await
                .map_err(minos::JudgeError::from)?;
            let out = self
                .backend
                .exec_command("./target/release/vis input.txt output.txt", Some(&case_dir), 30)
                .await
                .map_err(minos::JudgeError::from)?;
            images.push(if out.exit_code == 0 && !out.stdout.trim().is_empty() {
                Some(olympus_common::Visualisation {
                    media_type: "image/svg+xml".to_string(),
                    bytes: out.stdout.into_bytes(),
                })
            } else {
                None
            });
        }

        let mut state = self.state.lock().await;
        self.log(&mut state, "local_visualization", serde_json::json!({"count": inputs.len()}));
        Ok(images)
    }

    /// Judge the public inputs with the problem's own limits
    /// (§4.F "public_eval").
    pub async fn public_eval(
        &self,
        code: String,
        language: String,
        judge_version: Option<String>,
        skip_visualisation: bool,
    ) -> Result<EvaluationResult, SessionError> {
        let mut state = self.state.lock().await;
        self.guard_before("public_eval", &state, &[ResourceField::NumCallPublicEval]).await?;
        let args = RunCasesArgs { code, language, judge_version, time_limit: None, memory_limit: None };
        let resolved = self.resolve_run_cases_args(&args, false).await?;
        state.last_public_eval_time = Some(Utc::now());

        let case_results = minos::run_cases(minos::RunCasesRequest {
            inputs: self.public_inputs.clone(),
            code: resolved.code,
            language: resolved.language,
            time_limit: self.problem.time_limit_seconds,
            memory_limit: self.problem.memory_limit_bytes,
            problem_type: self.problem.problem_type,
            tool_dir: self.tool_dir.clone(),
            return_details: true,
            skip_visualisation,
            num_workers: self.num_workers,
            backend: Arc::clone(&self.backend),
            compile_timeout_secs: self.compile_timeout_secs,
        })
        .await?;
        if case_results.len() != self.public_inputs.len() {
            return Err(SessionError::Internal(
                "the number of case results must equal the number of public seeds".to_string(),
            ));
        }

        let delta = ResourceUsage { num_call_public_eval: 1, ..ResourceUsage::ZERO };
        state.current_resource_usage = state.current_resource_usage + delta;
        self.guard_after("public_eval", &state)?;
        self.log(&mut state, "public_eval", serde_json::json!({"language": args.language}));
        Ok(EvaluationResult { case_results, resource_usage: delta })
    }

    /// Judge the private inputs and fold the result into the
    /// contest's standings, redacting everything but verdict/score/
    /// time/memory per case (§4.F "private_eval").
    pub async fn private_eval(
        &self,
        code: String,
        language: String,
        judge_version: Option<String>,
    ) -> Result<(EvaluationResult, u64, f64), SessionError> {
        let mut state = self.state.lock().await;
        self.guard_before("private_eval", &state, &[ResourceField::NumCallPrivateEval]).await?;
        let args = RunCasesArgs { code, language, judge_version, time_limit: None, memory_limit: None };
        let resolved = self.resolve_run_cases_args(&args, false).await?;
        state.last_private_eval_time = Some(Utc::now());

        let case_results = minos::run_cases(minos::RunCasesRequest {
            inputs: self.private_inputs.clone(),
            code: resolved.code,
            language: resolved.language,
            time_limit: self.problem.time_limit_seconds,
            memory_limit: self.problem.memory_limit_bytes,
            problem_type: self.problem.problem_type,
            tool_dir: self.tool_dir.clone(),
            return_details: false,
            skip_visualisation: true,
            num_workers: self.num_workers,
            backend: Arc::clone(&self.backend),
            compile_timeout_secs: self.compile_timeout_secs,
        })
        .await?;
        if case_results.len() != self.private_inputs.len() {
            return Err(SessionError::Internal(
                "the number of case results must equal the number of private seeds".to_string(),
            ));
        }

        let delta = ResourceUsage { num_call_private_eval: 1, ..ResourceUsage::ZERO };
        state.current_resource_usage = state.current_resource_usage + delta;
        state.private_eval_called = true;
        self.guard_after("private_eval", &state)?;
        self.log(&mut state, "private_eval", serde_json::json!({"language": args.language}));

        let overall_score = EvaluationResult {
            case_results: case_results.clone(),
            resource_usage: delta,
        }
        .overall_absolute_score(true);
        let (new_rank, _) = self.standings.rank_for_score(overall_score);

        let per_case_scores: Vec<i64> = case_results.iter().map(|c| c.absolute_score).collect();
        let (relative_scores, new_performance_rank) = match &self.relative_results {
            Some(relative) => {
                let eval = relative.evaluate(&per_case_scores);
                (eval.per_case.into_iter().map(Some).collect::<Vec<_>>(), eval.fractional_rank)
            }
            None => {
                let (_, fractional) = self.standings.rank_for_score(overall_score);
                (vec![None; case_results.len()], fractional)
            }
        };
        let new_performance = self
            .rank_performance_map
            .get_performance(new_performance_rank)
            .map_err(SessionError::Internal)?;

        let redacted: Vec<CaseResult> = case_results
            .into_iter()
            .zip(relative_scores)
            .map(|(mut c, relative_score)| {
                c.relative_score = relative_score;
                c.redacted_for_private_eval()
            })
            .collect();

        Ok((
            EvaluationResult { case_results: redacted, resource_usage: delta },
            new_rank,
            new_performance,
        ))
    }

    // ── Snapshot / lifecycle ─────────────────────────────────────────

    /// Dump session state as one portable JSON document (§4.F "Snapshot").
    pub async fn save(&self) -> serde_json::Value {
        let state = self.state.lock().await;
        serde_json::json!({
            "problem_id": self.problem.problem_id,
            "lite_version": self.lite_version,
            "public_seeds": self.public_seeds,
            "private_seeds": self.private_seeds,
            "use_same_time_scale": self.use_same_time_scale,
            "maximum_resource_usage": self.maximum_resource_usage,
            "current_resource_usage": state.current_resource_usage,
            "session_duration_seconds": self.session_duration.num_seconds(),
            "port": self.port,
            "num_workers": self.num_workers,
            "action_log": state.action_log,
            "last_public_eval_time": state.last_public_eval_time.map(|t| t.timestamp()),
            "last_private_eval_time": state.last_private_eval_time.map(|t| t.timestamp()),
            "session_started_at": self.session_started_at.timestamp(),
            "session_paused_at": Utc::now().timestamp(),
        })
    }

    /// Rebuild a `Session` from a document `save` produced (§4.F
    /// "Snapshot", §8 "save followed by load reproduces a session").
    /// Regenerates `public_inputs`/`private_inputs` from the snapshot's
    /// own seed lists rather than trusting whatever the loader hands
    /// back for them, since those are what the saved budget and action
    /// log were actually measured against.
    pub async fn load(
        snapshot: &serde_json::Value,
        loaded: LoadedProblem,
        tool_dir: String,
        config: SessionConfig,
        backend: Arc<dyn Backend>,
    ) -> Result<Session, SessionError> {
        fn field<'a>(snapshot: &'a serde_json::Value, key: &str) -> Result<&'a serde_json::Value, SessionError> {
            snapshot
                .get(key)
                .ok_or_else(|| SessionError::InvalidArgument(format!("snapshot missing `{key}`")))
        }
        fn parse<T: serde::de::DeserializeOwned>(snapshot: &serde_json::Value, key: &str) -> Result<T, SessionError> {
            serde_json::from_value(field(snapshot, key)?.clone())
                .map_err(|e| SessionError::InvalidArgument(format!("snapshot field `{key}`: {e}")))
        }
        fn timestamp(secs: i64) -> Result<DateTime<Utc>, SessionError> {
            DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| SessionError::InvalidArgument(format!("snapshot timestamp `{secs}` out of range")))
        }

        let problem_id: String = parse(snapshot, "problem_id")?;
        if problem_id != loaded.problem.problem_id {
            return Err(SessionError::InvalidArgument(format!(
                "snapshot is for problem `{problem_id}`, not `{}`",
                loaded.problem.problem_id
            )));
        }

        let public_seeds: Vec<u64> = parse(snapshot, "public_seeds")?;
        let private_seeds: Vec<u64> = parse(snapshot, "private_seeds")?;
        let public_inputs = minos::generate_inputs(
            &public_seeds,
            &Default::default(),
            &tool_dir,
            &backend,
            config.generation_timeout_secs,
        )
        .await?;
        let private_inputs = minos::generate_inputs(
            &private_seeds,
            &Default::default(),
            &tool_dir,
            &backend,
            config.generation_timeout_secs,
        )
        .await?;

        let last_public_eval_time = snapshot
            .get("last_public_eval_time")
            .and_then(|v| v.as_i64())
            .map(timestamp)
            .transpose()?;
        let last_private_eval_time = snapshot
            .get("last_private_eval_time")
            .and_then(|v| v.as_i64())
            .map(timestamp)
            .transpose()?;
        let port = snapshot.get("port").and_then(|v| v.as_u64()).map(|p| p as u16);

        Ok(Session {
            problem: loaded.problem,
            lite_version: parse(snapshot, "lite_version")?,
            public_inputs,
            private_inputs,
            public_seeds,
            private_seeds,
            standings: loaded.standings,
            rank_performance_map: loaded.rank_performance_map,
            relative_results: loaded.relative_results,
            tool_dir,
            maximum_resource_usage: parse(snapshot, "maximum_resource_usage")?,
            session_duration: Duration::seconds(parse(snapshot, "session_duration_seconds")?),
            session_started_at: timestamp(parse(snapshot, "session_started_at")?)?,
            use_same_time_scale: parse(snapshot, "use_same_time_scale")?,
            num_workers: parse(snapshot, "num_workers")?,
            max_memory_limit_bytes: config.max_memory_limit_bytes,
            compile_timeout_secs: config.compile_timeout_secs,
            generation_timeout_secs: config.generation_timeout_secs,
            port,
            backend,
            state: Mutex::new(MutableState {
                current_resource_usage: parse(snapshot, "current_resource_usage")?,
                private_eval_called: last_private_eval_time.is_some(),
                last_public_eval_time,
                last_private_eval_time,
                action_log: parse(snapshot, "action_log")?,
            }),
        })
    }

    /// Release per-session scratch storage (§3 "Session" lifecycle).
    pub async fn close(&self) -> Result<(), SessionError> {
        self.backend.close().await.map_err(|e| SessionError::Internal(e.to_string()))
    }

    // ── Accessors ─────────────────────────────────────────────────────

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn public_inputs(&self) -> &[String] {
        &self.public_inputs
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub async fn current_resource_usage(&self) -> ResourceUsage {
        self.state.lock().await.current_resource_usage
    }

    /// Deliberately unavailable: private seeds must never leak through
    /// any accessor (§4.F "Three accessors").
    pub fn private_seeds(&self) -> Result<&[u64], SessionError> {
        Err(SessionError::NotAvailable("private_seeds"))
    }

    /// Deliberately unavailable (§4.F "Three accessors").
    pub fn standings(&self) -> Result<&Standings, SessionError> {
        Err(SessionError::NotAvailable("standings"))
    }

    /// Deliberately unavailable (§4.F "Three accessors").
    pub fn rank_performance_map(&self) -> Result<&RankPerformanceMap, SessionError> {
        Err(SessionError::NotAvailable("rank_performance_map"))
    }
}

/// Cheap path-safe tag for per-call scratch directories; collisions
/// only risk directory reuse within one session's `tool_dir`, not
/// correctness across sessions.
fn crc32(s: &str) -> u32 {
    let mut hash: u32 = 0xFFFF_FFFF;
    for byte in s.bytes() {
        hash ^= byte as u32;
        for _ in 0..8 {
            let mask = (hash & 1).wrapping_neg();
            hash = (hash >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use olympus_common::{ProblemType, ScoreType};
    use sisyphus::{Config as BackendConfig, LocalBackend};
    use std::path::PathBuf;

    fn sample_loaded() -> LoadedProblem {
        let now = Utc::now();
        LoadedProblem {
            problem: Problem {
                problem_id: "p1".to_string(),
                problem_type: ProblemType::Batch,
                score_type: ScoreType::Maximize,
                time_limit_seconds: 2.0,
                memory_limit_bytes: 256 * 1024 * 1024,
                tool_dir: PathBuf::from("/tmp/p1"),
                start_at: now,
                end_at: now + Duration::hours(2),
                lenient_public_scoring: false,
                visualisation_known_empty: false,
            },
            public_seeds: vec![1, 2],
            private_seeds: vec![3, 4],
            standings: Standings::new(vec![(1, 100), (2, 0)]).unwrap(),
            rank_performance_map: RankPerformanceMap::new(vec![(1.0, 3000.0), (2.0, 1000.0)]).unwrap(),
            relative_results: None,
        }
    }

    fn sample_backend(dir: &tempfile::TempDir) -> Arc<dyn Backend> {
        Arc::new(LocalBackend::new(BackendConfig {
            judge_dir: dir.path().join("judge").to_string_lossy().to_string(),
            work_dir: dir.path().join("work").to_string_lossy().to_string(),
            compile_timeout_secs: 5,
            generation_timeout_secs: 5,
            container_images: Default::default(),
            max_memory_bytes: 1 << 30,
            docker_api_version: None,
            docker_host: None,
        }))
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
    async fn deliberately_unavailable_accessors_always_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(
            sample_loaded(),
            false,
            vec!["1\n".to_string()],
            vec!["2\n".to_string()],
            dir.path().to_string_lossy().to_string(),
            ResourceUsage { num_case_gen: 10, num_case_eval: 10, execution_time_case_eval: 10.0, num_call_public_eval: 5, num_call_private_eval: 1 },
            sample_config(),
            sample_backend(&dir),
        );
        assert!(session.private_seeds().is_err());
        assert!(session.standings().is_err());
        assert!(session.rank_performance_map().is_err());
    }

    #[tokio::test]
    async fn budget_exceeded_before_case_gen_when_max_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(
            sample_loaded(),
            false,
            vec![],
            vec![],
            dir.path().to_string_lossy().to_string(),
            ResourceUsage::ZERO,
            sample_config(),
            sample_backend(&dir),
        );
        let err = session
            .case_gen(vec![1], std::collections::BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::BudgetExceeded { action: "case_gen" }));
    }

    #[tokio::test]
    async fn private_eval_blocks_every_further_action_once_called() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(
            sample_loaded(),
            false,
            vec![],
            vec![],
            dir.path().to_string_lossy().to_string(),
            ResourceUsage::ZERO,
            sample_config(),
            sample_backend(&dir),
        );
        {
            let mut state = session.state.lock().await;
            state.private_eval_called = true;
        }
        let err = session
            .case_gen(vec![1], std::collections::BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::SessionFinished));
    }

    fn sample_loaded_empty_seeds() -> LoadedProblem {
        LoadedProblem { public_seeds: vec![], private_seeds: vec![], ..sample_loaded() }
    }

    #[tokio::test]
    async fn save_then_load_reproduces_budget_and_log() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new_with_port(
            sample_loaded_empty_seeds(),
            false,
            vec![],
            vec![],
            dir.path().to_string_lossy().to_string(),
            ResourceUsage { num_case_gen: 10, num_case_eval: 10, execution_time_case_eval: 10.0, num_call_public_eval: 5, num_call_private_eval: 1 },
            sample_config(),
            sample_backend(&dir),
            Some(8080),
        );
        session
            .case_gen(vec![], std::collections::BTreeMap::new())
            .await
            .unwrap();

        let snapshot = session.save().await;
        assert_eq!(snapshot["public_seeds"], serde_json::json!([]));
        assert_eq!(snapshot["port"], serde_json::json!(8080));

        let restored = Session::load(
            &snapshot,
            sample_loaded_empty_seeds(),
            dir.path().to_string_lossy().to_string(),
            sample_config(),
            sample_backend(&dir),
        )
        .await
        .unwrap();

        assert_eq!(restored.port, Some(8080));
        assert_eq!(
            restored.current_resource_usage().await.num_case_gen,
            session.current_resource_usage().await.num_case_gen,
        );
        let err = restored.case_gen(vec![1], std::collections::BTreeMap::new()).await;
        assert!(err.is_ok() || matches!(err, Err(SessionError::BudgetExceeded { .. })));
    }

    #[tokio::test]
    async fn load_rejects_a_snapshot_for_a_different_problem() {
        let dir = tempfile::tempdir().unwrap();
        let mut other = sample_loaded_empty_seeds();
        other.problem.problem_id = "other".to_string();
        let session = Session::new(
            sample_loaded_empty_seeds(),
            false,
            vec![],
            vec![],
            dir.path().to_string_lossy().to_string(),
            ResourceUsage::ZERO,
            sample_config(),
            sample_backend(&dir),
        );
        let snapshot = session.save().await;
        let err = Session::load(&snapshot, other, dir.path().to_string_lossy().to_string(), sample_config(), sample_backend(&dir))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidArgument(_)));
    }
}
