//! Per-case and aggregate judge results (§3 "CaseResult"/"Result", §4.G).

use serde::{Deserialize, Serialize};

use crate::resource::ResourceUsage;

/// Reserved absolute-score value signalling "no score to report"; used
/// for every non-ACCEPTED case (GLOSSARY "Rejected sentinel").
pub const REJECTED_SENTINEL: i64 = -1;

/// The outcome of judging a single case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JudgeVerdict {
    Accepted,
    WrongAnswer,
    RuntimeError,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    CompilationError,
    InternalError,
}

impl JudgeVerdict {
    pub fn is_accepted(self) -> bool {
        matches!(self, JudgeVerdict::Accepted)
    }
}

impl std::fmt::Display for JudgeVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JudgeVerdict::Accepted => "ACCEPTED",
            JudgeVerdict::WrongAnswer => "WRONG_ANSWER",
            JudgeVerdict::RuntimeError => "RUNTIME_ERROR",
            JudgeVerdict::TimeLimitExceeded => "TIME_LIMIT_EXCEEDED",
            JudgeVerdict::MemoryLimitExceeded => "MEMORY_LIMIT_EXCEEDED",
            JudgeVerdict::CompilationError => "COMPILATION_ERROR",
            JudgeVerdict::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{s}")
    }
}

/// An opaque visualisation artefact. The core never inspects the bytes
/// (§9 design note); only the declared media type is meaningful to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visualisation {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Per-case record (§3 "CaseResult").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub judge_result: JudgeVerdict,
    pub message: String,
    pub absolute_score: i64,
    pub relative_score: Option<f64>,
    pub execution_time: f64,
    pub memory_usage: u64,
    pub input_str: Option<String>,
    pub output_str: Option<String>,
    pub error_str: Option<String>,
    pub local_visualization: Option<Visualisation>,
}

impl CaseResult {
    pub fn rejected(verdict: JudgeVerdict, message: impl Into<String>) -> Self {
        debug_assert!(!verdict.is_accepted());
        CaseResult {
            judge_result: verdict,
            message: message.into(),
            absolute_score: REJECTED_SENTINEL,
            relative_score: None,
            execution_time: 0.0,
            memory_usage: 0,
            input_str: None,
            output_str: None,
            error_str: None,
            local_visualization: None,
        }
    }

    pub fn accepted(score: i64, execution_time: f64, memory_usage: u64) -> Self {
        CaseResult {
            judge_result: JudgeVerdict::Accepted,
            message: String::new(),
            absolute_score: score,
            relative_score: None,
            execution_time,
            memory_usage,
            input_str: None,
            output_str: None,
            error_str: None,
            local_visualization: None,
        }
    }

    /// Strip details when `return_details = false` (§4.C "Return contract").
    pub fn without_details(mut self) -> Self {
        self.input_str = None;
        self.output_str = None;
        self.error_str = None;
        self
    }

    /// Strip everything `private_eval` must not expose (§4.F
    /// "private_eval"): raw I/O, message, and visualisation, keeping
    /// only verdict/score/time/memory.
    pub fn redacted_for_private_eval(mut self) -> Self {
        self.message.clear();
        self.input_str = None;
        self.output_str = None;
        self.error_str = None;
        self.local_visualization = None;
        self
    }
}

/// Aggregate of per-case [`CaseResult`]s plus a resource-usage
/// attribution (§3 "Result").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub case_results: Vec<CaseResult>,
    pub resource_usage: ResourceUsage,
}

impl EvaluationResult {
    /// §4.G "Result Aggregator": the first non-ACCEPTED verdict in list
    /// order, or ACCEPTED if every case accepted (or the list is empty).
    pub fn overall_judge_result(&self) -> JudgeVerdict {
        self.case_results
            .iter()
            .find(|c| !c.judge_result.is_accepted())
            .map(|c| c.judge_result)
            .unwrap_or(JudgeVerdict::Accepted)
    }

    /// §4.G: sum of per-case scores if every verdict is ACCEPTED, or if
    /// `allow_score_non_ac` is set; otherwise the rejected sentinel.
    pub fn overall_absolute_score(&self, allow_score_non_ac: bool) -> i64 {
        let all_accepted = self
            .case_results
            .iter()
            .all(|c| c.judge_result.is_accepted());
        if all_accepted || allow_score_non_ac {
            self.case_results.iter().map(|c| c.absolute_score).sum()
        } else {
            REJECTED_SENTINEL
        }
    }

    /// Same rule as [`Self::overall_absolute_score`], applied to
    /// relative scores; `None` unless every case carries one (or the
    /// leniency flag is set and at least one case does).
    pub fn overall_relative_score(&self, allow_score_non_ac: bool) -> Option<f64> {
        let all_accepted = self
            .case_results
            .iter()
            .all(|c| c.judge_result.is_accepted());
        if !(all_accepted || allow_score_non_ac) {
            return None;
        }
        if self.case_results.iter().any(|c| c.relative_score.is_none()) {
            return None;
        }
        Some(self.case_results.iter().filter_map(|c| c.relative_score).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(score: i64) -> CaseResult {
        CaseResult::accepted(score, 0.1, 1024)
    }

    #[test]
    fn overall_judge_result_is_first_non_accepted_in_order() {
        let result = EvaluationResult {
            case_results: vec![
                accepted(10),
                CaseResult::rejected(JudgeVerdict::WrongAnswer, "bad"),
                CaseResult::rejected(JudgeVerdict::TimeLimitExceeded, "slow"),
            ],
            resource_usage: ResourceUsage::ZERO,
        };
        assert_eq!(result.overall_judge_result(), JudgeVerdict::WrongAnswer);
    }

    #[test]
    fn overall_judge_result_is_accepted_when_list_is_empty_or_all_accepted() {
        let empty = EvaluationResult {
            case_results: vec![],
            resource_usage: ResourceUsage::ZERO,
        };
        assert_eq!(empty.overall_judge_result(), JudgeVerdict::Accepted);

        let all_ac = EvaluationResult {
            case_results: vec![accepted(1), accepted(2)],
            resource_usage: ResourceUsage::ZERO,
        };
        assert_eq!(all_ac.overall_judge_result(), JudgeVerdict::Accepted);
        assert_eq!(all_ac.overall_absolute_score(false), 3);
    }

    #[test]
    fn non_ac_score_is_sentinel_unless_leniency_allows_it() {
        let result = EvaluationResult {
            case_results: vec![accepted(10), CaseResult::rejected(JudgeVerdict::WrongAnswer, "x")],
            resource_usage: ResourceUsage::ZERO,
        };
        assert_eq!(result.overall_absolute_score(false), REJECTED_SENTINEL);
        assert_eq!(result.overall_absolute_score(true), 10 + REJECTED_SENTINEL);
    }
}
