//! Raw compile-and-run primitive (§4.F "code_run"): execute submitted
//! code against a single input without judging it. Only execution time
//! is meant to be accounted by the caller; nothing else is inferred.

use std::sync::Arc;

use olympus_common::{Language, ProblemType};
use sisyphus::{parse_profile, Backend, ParseOutcome};

use crate::error::JudgeError;
use crate::runner::{build_run_command, compile, run_wall_timeout, RunCasesRequest};
use crate::toolchain;

const OBJECT_EXT: &str = "bin";

pub struct CodeRunRequest {
    pub input: String,
    pub code: String,
    pub language: Language,
    pub time_limit: f64,
    pub memory_limit: u64,
    pub tool_dir: String,
    pub backend: Arc<dyn Backend>,
    pub compile_timeout_secs: u64,
}

/// Raw result of running code against one input: exit status and
/// stdout/stderr as observed, plus the resources the run consumed.
pub struct CodeRunOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
    pub execution_time: f64,
    pub memory_usage: u64,
}

/// Compiles once (if needed) and runs the solution against `req.input`,
/// reusing the Case Runner's compile step and `RUN_COMMAND` shape but
/// skipping the judge call entirely.
pub async fn run_code(req: CodeRunRequest) -> Result<CodeRunOutcome, JudgeError> {
    let toolchain = toolchain::resolve(req.language, OBJECT_EXT);
    let backend = Arc::clone(&req.backend);
    let tool_dir = req.tool_dir.clone();
    let time_limit = req.time_limit;

    let compile_req = RunCasesRequest {
        inputs: vec![req.input.clone()],
        code: req.code,
        language: req.language,
        time_limit,
        memory_limit: req.memory_limit,
        problem_type: ProblemType::Batch,
        tool_dir: tool_dir.clone(),
        return_details: true,
        skip_visualisation: true,
        num_workers: 1,
        backend: Arc::clone(&backend),
        compile_timeout_secs: req.compile_timeout_secs,
    };

    if !compile(&compile_req, &toolchain).await? {
        return Ok(CodeRunOutcome {
            stdout: String::new(),
            stderr: "compilation failed".to_string(),
            exit_status: -1,
            execution_time: 0.0,
            memory_usage: 0,
        });
    }

    let case_dir = format!("{tool_dir}/code_run");
    backend.mkdir(&case_dir).await?;
    let input_path = format!("{case_dir}/input.txt");
    let output_path = format!("{case_dir}/output.txt");
    let profile_path = format!("{case_dir}/profile.json");
    for (path, content) in [(&input_path, req.input.as_bytes()), (&output_path, b""), (&profile_path, b"")] {
        backend.write_file(path, content).await?;
    }

    let run_cmd = build_run_command(ProblemType::Batch, time_limit, &toolchain.run_command);
    let cap = run_wall_timeout(time_limit);
    let start = std::time::Instant::now();
    let exec_output = backend.exec_command(&run_cmd, Some(&case_dir), cap).await?;
    let host_wall = start.elapsed().as_secs_f64();

    let profile_raw = match backend.read_file(&profile_path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(_) => String::new(),
    };
    let (execution_time, memory_usage) = match parse_profile(&profile_raw, host_wall, time_limit, req.memory_limit) {
        ParseOutcome::Profile(p) => (p.execution_time, p.memory_usage),
        ParseOutcome::Verdict(_) => (host_wall.min(time_limit + 0.1), 0),
    };

    let stdout = match backend.read_file(&output_path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(_) => String::new(),
    };

    Ok(CodeRunOutcome {
        stdout,
        stderr: exec_output.stderr,
        exit_status: exec_output.exit_code,
        execution_time,
        memory_usage,
    })
}
