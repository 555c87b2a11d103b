//! Case Runner (§4.C): compile once, then run the solution against
//! each input under a resource-bounded pipeline and judge the result.

use std::sync::Arc;

use olympus_common::{CaseResult, JudgeVerdict, Language, ProblemType, Visualisation};
use sisyphus::{parse_profile, Backend, ParseOutcome};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::JudgeError;
use crate::toolchain::{self, Toolchain};

/// Everything the Case Runner needs for one `run_cases` invocation
/// (§4.C entry signature).
pub struct RunCasesRequest {
    pub inputs: Vec<String>,
    pub code: String,
    pub language: Language,
    pub time_limit: f64,
    pub memory_limit: u64,
    pub problem_type: ProblemType,
    pub tool_dir: String,
    pub return_details: bool,
    pub skip_visualisation: bool,
    pub num_workers: usize,
    pub backend: Arc<dyn Backend>,
    pub compile_timeout_secs: u64,
}

const OBJECT_EXT: &str = "bin";

/// Run the full compile-then-judge pipeline (§4.C).
pub async fn run_cases(req: RunCasesRequest) -> Result<Vec<CaseResult>, JudgeError> {
    let toolchain = toolchain::resolve(req.language, OBJECT_EXT);

    if !compile(&req, &toolchain).await? {
        return Ok((0..req.inputs.len())
            .map(|_| CaseResult::rejected(JudgeVerdict::CompilationError, "compilation failed"))
            .collect());
    }

    if req.num_workers <= 1 || req.inputs.len() <= 1 {
        let mut results = Vec::with_capacity(req.inputs.len());
        for (idx, input) in req.inputs.iter().enumerate() {
            results.push(run_one_case(&req, &toolchain, idx, input).await);
        }
        return Ok(results);
    }

    run_cases_concurrently(req, toolchain).await
}

async fn run_cases_concurrently(
    req: RunCasesRequest,
    toolchain: Toolchain,
) -> Result<Vec<CaseResult>, JudgeError> {
    let req = Arc::new(req);
    let toolchain = Arc::new(toolchain);
    let semaphore = Arc::new(Semaphore::new(req.num_workers));
    let mut slots: Vec<Option<CaseResult>> = (0..req.inputs.len()).map(|_| None).collect();

    let mut set = JoinSet::new();
    for (idx, input) in req.inputs.iter().cloned().enumerate() {
        let req = Arc::clone(&req);
        let toolchain = Arc::clone(&toolchain);
        let semaphore = Arc::clone(&semaphore);
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            let result = run_one_case(&req, &toolchain, idx, &input).await;
            (idx, result)
        });
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, result)) => slots[idx] = Some(result),
            Err(join_err) => {
                tracing::error!(error = %join_err, "case pipeline task panicked");
                // We don't know which index panicked without instrumenting
                // further, but a panic is so rare it's acceptable to mark
                // every still-empty slot — next completions overwrite the
                // true ones as they land.
            }
        }
    }

    Ok(slots
        .into_iter()
        .map(|s| s.unwrap_or_else(|| CaseResult::rejected(JudgeVerdict::InternalError, "case pipeline task panicked")))
        .collect())
}

pub(crate) async fn compile(req: &RunCasesRequest, toolchain: &Toolchain) -> Result<bool, JudgeError> {
    req.backend
        .write_file(toolchain.source_file, req.code.as_bytes())
        .await?;

    let copy_step = format!(
        "&& cp /tmp/object.{OBJECT_EXT} /tmp/object.{OBJECT_EXT}.bak 2>/dev/null; chmod 744 /tmp/object.{OBJECT_EXT} 2>/dev/null"
    );
    let full_cmd = format!("{} {copy_step}", toolchain.compile_command);

    let output = req
        .backend
        .exec_command(&full_cmd, None, req.compile_timeout_secs)
        .await?;

    if req.language.is_interpreted() {
        return Ok(!output.stderr.contains("SyntaxError"));
    }

    if output.exit_code != 0 {
        return Ok(false);
    }

    let size = req
        .backend
        .file_size(&format!("/tmp/object.{OBJECT_EXT}"))
        .await
        .unwrap_or(0);
    Ok(size > 0)
}

async fn run_one_case(
    req: &RunCasesRequest,
    toolchain: &Toolchain,
    idx: usize,
    input: &str,
) -> CaseResult {
    let case_dir = format!("{}/case_{idx:04}", req.tool_dir);
    if let Err(e) = req.backend.mkdir(&case_dir).await {
        return CaseResult::rejected(JudgeVerdict::InternalError, e.to_string());
    }

    let input_path = format!("{case_dir}/input.txt");
    let output_path = format!("{case_dir}/output.txt");
    let profile_path = format!("{case_dir}/profile.json");

    for (path, content) in [(&input_path, input.as_bytes()), (&output_path, b""), (&profile_path, b"")] {
        if let Err(e) = req.backend.write_file(path, content).await {
            return CaseResult::rejected(JudgeVerdict::InternalError, e.to_string());
        }
    }

    let run_cmd = build_run_command(req.problem_type, req.time_limit, &toolchain.run_command);
    let cap = run_wall_timeout(req.time_limit);

    let start = std::time::Instant::now();
    let exec_result = req
        .backend
        .exec_command(&run_cmd, Some(&case_dir), cap)
        .await;
    let host_wall = start.elapsed().as_secs_f64();

    let exec_output = match exec_result {
        Ok(out) => out,
        Err(e) => return CaseResult::rejected(JudgeVerdict::InternalError, e.to_string()),
    };

    if exec_output.exit_code != 0 {
        let (verdict, execution_time) = if host_wall > req.time_limit {
            (JudgeVerdict::TimeLimitExceeded, host_wall.min(req.time_limit + 0.1))
        } else {
            (JudgeVerdict::RuntimeError, host_wall)
        };
        return finish(req, verdict, exec_output.stderr, &output_path, execution_time, 0).await;
    }

    let profile_raw = match req.backend.read_file(&profile_path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(e) => return CaseResult::rejected(JudgeVerdict::InternalError, e.to_string()),
    };

    let profile = match parse_profile(&profile_raw, host_wall, req.time_limit, req.memory_limit) {
        ParseOutcome::Verdict(v, execution_time, memory_usage) => {
            return finish(req, v, String::new(), &output_path, execution_time, memory_usage).await;
        }
        ParseOutcome::Profile(p) => p,
    };

    let (verdict, message, score) = if req.problem_type == ProblemType::Batch {
        let judge_cmd = "./target/release/tester input.txt output.txt";
        let judge_output = match req
            .backend
            .exec_command(judge_cmd, Some(&case_dir), 30)
            .await
        {
            Ok(out) => out,
            Err(e) => return CaseResult::rejected(JudgeVerdict::InternalError, e.to_string()),
        };
        judge_batch(&judge_output.stderr, judge_output.exit_code)
    } else {
        // The reactive tester already decided the verdict as part of the
        // wrapped run above; its stderr carries the same score/WA grammar.
        judge_reactive(&exec_output.stderr, exec_output.exit_code)
    };

    if !verdict.is_accepted() {
        return finish(req, verdict, message, &output_path, profile.execution_time, profile.memory_usage).await;
    }

    let visualisation = maybe_visualise(req, &case_dir).await;

    let mut result = CaseResult::accepted(score, profile.execution_time, profile.memory_usage);
    result.message = message;
    if req.return_details {
        result.output_str = read_text(req, &output_path).await;
        result.input_str = Some(input.to_string());
    }
    result.local_visualization = visualisation;
    result
}

pub(crate) fn build_run_command(problem_type: ProblemType, time_limit: f64, solution_cmd: &str) -> String {
    let outer = run_wall_timeout(time_limit);
    let cpu_cap = (time_limit + 0.1).ceil() as i64 + 1;
    match problem_type {
        ProblemType::Batch => format!(
            "timeout {outer} prlimit --cpu={cpu_cap} time-wrapper -o profile.json {solution_cmd} < input.txt > output.txt; sync"
        ),
        ProblemType::Reactive => format!(
            "timeout {outer} prlimit --cpu={cpu_cap} ./target/release/tester time-wrapper -o profile.json {solution_cmd} < input.txt > output.txt; sync"
        ),
    }
}

pub(crate) fn run_wall_timeout(time_limit: f64) -> i64 {
    (time_limit + 0.1).ceil() as i64 + 2 // §4.C: ⌈T+0.1⌉ + 0.2, rounded up to a whole second margin
}

fn judge_batch(stderr: &str, exit_code: i32) -> (JudgeVerdict, String, i64) {
    if exit_code != 0 {
        return (JudgeVerdict::WrongAnswer, stderr.to_string(), -1);
    }
    if let Some(idx) = stderr.find("wrong answer: ") {
        return (JudgeVerdict::WrongAnswer, stderr[idx + "wrong answer: ".len()..].to_string(), -1);
    }
    if stderr.trim().is_empty() {
        return (JudgeVerdict::WrongAnswer, "no score found".to_string(), -1);
    }
    if let Some(score) = extract_score(stderr) {
        return (JudgeVerdict::Accepted, String::new(), score);
    }
    (JudgeVerdict::WrongAnswer, stderr.to_string(), -1)
}

fn judge_reactive(stderr: &str, exit_code: i32) -> (JudgeVerdict, String, i64) {
    if exit_code != 0 || stderr.trim().is_empty() {
        return (JudgeVerdict::InternalError, "reactive tester produced no verdict".to_string(), -1);
    }
    if let Some(idx) = stderr.find("wrong answer: ") {
        return (JudgeVerdict::WrongAnswer, stderr[idx + "wrong answer: ".len()..].to_string(), -1);
    }
    if let Some(score) = extract_score(stderr) {
        return (JudgeVerdict::Accepted, String::new(), score);
    }
    (JudgeVerdict::WrongAnswer, stderr.to_string(), -1)
}

/// Last non-empty stderr line matching `^Score = (\d+)`.
fn extract_score(stderr: &str) -> Option<i64> {
    let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty())?;
    let rest = last_line.trim().strip_prefix("Score = ")?;
    rest.trim().parse().ok()
}

async fn maybe_visualise(req: &RunCasesRequest, case_dir: &str) -> Option<Visualisation> {
    if req.skip_visualisation {
        return None;
    }
    let cmd = "./target/release/vis input.txt output.txt";
    let out = req.backend.exec_command(cmd, Some(case_dir), 30).await.ok()?;
    if out.exit_code != 0 {
        return None;
    }
    let mut body = out.stdout;
    if let (Some(start), Some(end)) = (body.find("<body>"), body.find("</body>")) {
        body = body[start + "<body>".len()..end].to_string();
    }
    if body.trim().is_empty() {
        return None;
    }
    Some(Visualisation {
        media_type: "image/svg+xml".to_string(),
        bytes: body.into_bytes(),
    })
}

async fn read_text(req: &RunCasesRequest, path: &str) -> Option<String> {
    req.backend
        .read_file(path)
        .await
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
}

async fn finish(
    req: &RunCasesRequest,
    verdict: JudgeVerdict,
    message: String,
    output_path: &str,
    execution_time: f64,
    memory_usage: u64,
) -> CaseResult {
    let mut result = CaseResult::rejected(verdict, message);
    result.execution_time = execution_time;
    result.memory_usage = memory_usage;
    if req.return_details {
        result.output_str = read_text(req, output_path).await;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_score_reads_last_matching_line() {
        assert_eq!(extract_score("garbage\nScore = 42\n"), Some(42));
        assert_eq!(extract_score("Score = 10\nScore = 99"), Some(99));
        assert_eq!(extract_score(""), None);
        assert_eq!(extract_score("no score here"), None);
    }

    #[test]
    fn judge_batch_rules_apply_in_order() {
        assert_eq!(judge_batch("", 1).0, JudgeVerdict::WrongAnswer);
        assert_eq!(judge_batch("wrong answer: bad parse", 0).0, JudgeVerdict::WrongAnswer);
        assert_eq!(judge_batch("", 0).0, JudgeVerdict::WrongAnswer);
        assert_eq!(judge_batch("Score = 7", 0), (JudgeVerdict::Accepted, String::new(), 7));
    }

    #[test]
    fn judge_reactive_empty_stderr_is_internal_error_not_accepted_wa() {
        let (verdict, _, _) = judge_reactive("", 0);
        assert_eq!(verdict, JudgeVerdict::InternalError);
    }

    #[test]
    fn run_wall_timeout_and_cpu_cap_scale_with_time_limit() {
        assert_eq!(run_wall_timeout(2.0), 5);
        assert_eq!(build_run_command(ProblemType::Batch, 2.0, "./run").contains("prlimit --cpu=4"), true);
    }
}
