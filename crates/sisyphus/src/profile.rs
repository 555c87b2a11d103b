//! Profile Parser (§4.B): turns the timing wrapper's raw text into a
//! structured [`Profile`] or a [`olympus_common::JudgeVerdict`].

use olympus_common::JudgeVerdict;
use serde::Deserialize;

/// Parsed resource-usage record for a single case run.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub exit_status: i32,
    pub execution_time: f64,
    pub memory_usage: u64,
}

/// The JSON shape a conforming timing wrapper writes to `profile.json`
/// (§4.B.1), before the Profile Parser derives [`Profile`] from it.
#[derive(Debug, Deserialize)]
struct Profiles {
    exit_status: i32,
    elapsed_time_seconds: f64,
    user_cpu_seconds: f64,
    system_cpu_seconds: f64,
    max_resident_set_size_kbytes: u64,
}

/// Either a clean [`Profile`] or the verdict the Case Runner should
/// report directly, skipping the judge step entirely. The verdict still
/// carries the resource usage observed up to the point of failure
/// (clamped per rule 7 when it's a timing verdict), since RE/TLE/MLE
/// cases are reported alongside real `execution_time`/`memory_usage`
/// just like an accepted one (§8 invariant 5).
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Profile(Profile),
    Verdict(JudgeVerdict, f64, u64),
}

/// Apply the §4.B rule sequence to the raw profile-file content.
///
/// `host_wall` is the wall-clock time the caller itself observed for
/// the whole run (used by rule 1 when the file is empty); `time_limit`
/// and `memory_limit` are the case's declared limits.
pub fn parse_profile(
    raw: &str,
    host_wall: f64,
    time_limit: f64,
    memory_limit: u64,
) -> ParseOutcome {
    let trimmed_for_empty_check = raw.trim();
    if trimmed_for_empty_check.is_empty() {
        return if host_wall <= time_limit {
            ParseOutcome::Verdict(JudgeVerdict::RuntimeError, host_wall, 0)
        } else {
            ParseOutcome::Verdict(JudgeVerdict::TimeLimitExceeded, host_wall.min(time_limit + 0.1), 0)
        };
    }

    let mut content = raw;
    let mut tle_flag = false;

    if let Some(rest) = drop_first_line_if_prefixed(content, "Command terminated by signal 9") {
        content = rest;
        tle_flag = true;
    } else if let Some(rest) = drop_first_line_if_prefixed(content, "Command exited with non-zero status") {
        content = rest;
    }

    // Rule 4 distinguishes two failure modes: content that isn't even
    // valid JSON ("failure to parse" → WA) from valid JSON missing a
    // required field or carrying one of the wrong type ("fields
    // missing/invalid" → INTERNAL_ERROR). Parse to `Value` first so we
    // can tell them apart before committing to the typed struct.
    let trimmed = content.trim();
    let value: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(_) => return ParseOutcome::Verdict(JudgeVerdict::WrongAnswer, host_wall.min(time_limit + 0.1), 0),
    };
    let parsed: Profiles = match serde_json::from_value(value) {
        Ok(p) => p,
        Err(_) => return ParseOutcome::Verdict(JudgeVerdict::InternalError, host_wall.min(time_limit + 0.1), 0),
    };

    let execution_time = (parsed.elapsed_time_seconds)
        .max(parsed.user_cpu_seconds + parsed.system_cpu_seconds);
    let memory_usage = parsed.max_resident_set_size_kbytes * 1024;
    let clamped_time = execution_time.min(time_limit + 0.1);

    if parsed.exit_status != 0 {
        return ParseOutcome::Verdict(JudgeVerdict::RuntimeError, clamped_time, memory_usage);
    }
    if execution_time > time_limit || tle_flag {
        return ParseOutcome::Verdict(JudgeVerdict::TimeLimitExceeded, clamped_time, memory_usage);
    }
    if memory_usage > memory_limit {
        return ParseOutcome::Verdict(JudgeVerdict::MemoryLimitExceeded, clamped_time, memory_usage);
    }

    ParseOutcome::Profile(Profile {
        exit_status: parsed.exit_status,
        execution_time: execution_time.min(time_limit + 0.1),
        memory_usage,
    })
}

fn drop_first_line_if_prefixed<'a>(content: &'a str, prefix: &str) -> Option<&'a str> {
    let trimmed_start = content.trim_start();
    if !trimmed_start.starts_with(prefix) {
        return None;
    }
    match trimmed_start.find('\n') {
        Some(idx) => Some(&trimmed_start[idx + 1..]),
        None => Some(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(exit_status: i32, elapsed: f64, user: f64, sys: f64, rss_kb: u64) -> String {
        format!(
            r#"{{"exit_status":{exit_status},"elapsed_time_seconds":{elapsed},"user_cpu_seconds":{user},"system_cpu_seconds":{sys},"max_resident_set_size_kbytes":{rss_kb}}}"#
        )
    }

    #[test]
    fn empty_content_is_rte_or_tle_depending_on_host_wall() {
        assert_eq!(
            parse_profile("", 1.0, 2.0, 1 << 30),
            ParseOutcome::Verdict(JudgeVerdict::RuntimeError, 1.0, 0)
        );
        assert_eq!(
            parse_profile("  \n", 5.0, 2.0, 1 << 30),
            ParseOutcome::Verdict(JudgeVerdict::TimeLimitExceeded, 2.1, 0)
        );
    }

    #[test]
    fn malformed_json_is_wrong_answer() {
        let outcome = parse_profile("not json at all", 0.5, 2.0, 1 << 30);
        assert_eq!(outcome, ParseOutcome::Verdict(JudgeVerdict::WrongAnswer, 0.5, 0));
    }

    #[test]
    fn signal_9_prefix_forces_tle_even_under_the_limit() {
        let body = record(0, 0.5, 0.1, 0.1, 1024);
        let raw = format!("Command terminated by signal 9\n{body}");
        let outcome = parse_profile(&raw, 0.5, 2.0, 1 << 30);
        assert_eq!(outcome, ParseOutcome::Verdict(JudgeVerdict::TimeLimitExceeded, 0.5, 1024 * 1024));
    }

    #[test]
    fn valid_json_missing_a_required_field_is_internal_error() {
        let body = r#"{"exit_status":0,"elapsed_time_seconds":0.5}"#;
        let outcome = parse_profile(body, 0.5, 2.0, 1 << 30);
        assert_eq!(outcome, ParseOutcome::Verdict(JudgeVerdict::InternalError, 0.5, 0));
    }

    #[test]
    fn non_zero_exit_status_is_runtime_error() {
        let body = record(1, 0.2, 0.1, 0.05, 1024);
        let outcome = parse_profile(&body, 0.2, 2.0, 1 << 30);
        assert_eq!(outcome, ParseOutcome::Verdict(JudgeVerdict::RuntimeError, 0.2, 1024 * 1024));
    }

    #[test]
    fn over_time_limit_clamps_reported_time() {
        let body = record(0, 5.0, 4.9, 0.0, 1024);
        let outcome = parse_profile(&body, 5.0, 2.0, 1 << 30);
        match outcome {
            ParseOutcome::Verdict(JudgeVerdict::TimeLimitExceeded, execution_time, _) => {
                assert!((execution_time - 2.1).abs() < 1e-9);
            }
            other => panic!("expected TLE, got {other:?}"),
        }
    }

    #[test]
    fn over_memory_limit_is_mle() {
        let body = record(0, 0.5, 0.1, 0.05, 2048);
        let outcome = parse_profile(&body, 0.5, 2.0, 1024 * 1024);
        assert_eq!(outcome, ParseOutcome::Verdict(JudgeVerdict::MemoryLimitExceeded, 0.5, 2048 * 1024));
    }

    #[test]
    fn clean_run_returns_structured_profile() {
        let body = record(0, 0.5, 0.2, 0.1, 1024);
        let outcome = parse_profile(&body, 0.5, 2.0, 1 << 30);
        match outcome {
            ParseOutcome::Profile(p) => {
                assert_eq!(p.exit_status, 0);
                assert!((p.execution_time - 0.5).abs() < 1e-9);
                assert_eq!(p.memory_usage, 1024 * 1024);
            }
            other => panic!("expected Profile, got {other:?}"),
        }
    }
}
