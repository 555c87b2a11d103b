//! JSON-transport variants of the in-process result types (§3.1).
//!
//! `CaseResult`/`EvaluationResult` already derive `Serialize`, but their
//! `Visualisation` field carries a raw byte blob that's awkward at a
//! JSON boundary. These wire types base64-encode it instead, mirroring
//! the original's `CaseResultSerializable`/`ResultSerializable` split
//! between an in-process type and a JSON-transport type.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::case_result::{CaseResult, EvaluationResult, JudgeVerdict, Visualisation};
use crate::resource::ResourceUsage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualisationWire {
    pub media_type: String,
    pub base64_data: String,
}

impl From<Visualisation> for VisualisationWire {
    fn from(v: Visualisation) -> Self {
        VisualisationWire {
            media_type: v.media_type,
            base64_data: base64::engine::general_purpose::STANDARD.encode(v.bytes),
        }
    }
}

impl TryFrom<VisualisationWire> for Visualisation {
    type Error = String;

    fn try_from(wire: VisualisationWire) -> Result<Self, Self::Error> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(wire.base64_data)
            .map_err(|e| format!("invalid base64 image data: {e}"))?;
        Ok(Visualisation {
            media_type: wire.media_type,
            bytes,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResultWire {
    pub judge_result: JudgeVerdict,
    pub message: String,
    pub absolute_score: i64,
    pub relative_score: Option<f64>,
    pub execution_time: f64,
    pub memory_usage: u64,
    pub input_str: Option<String>,
    pub output_str: Option<String>,
    pub error_str: Option<String>,
    pub local_visualization: Option<VisualisationWire>,
}

impl From<CaseResult> for CaseResultWire {
    fn from(c: CaseResult) -> Self {
        CaseResultWire {
            judge_result: c.judge_result,
            message: c.message,
            absolute_score: c.absolute_score,
            relative_score: c.relative_score,
            execution_time: c.execution_time,
            memory_usage: c.memory_usage,
            input_str: c.input_str,
            output_str: c.output_str,
            error_str: c.error_str,
            local_visualization: c.local_visualization.map(Into::into),
        }
    }
}

impl TryFrom<CaseResultWire> for CaseResult {
    type Error = String;

    fn try_from(w: CaseResultWire) -> Result<Self, Self::Error> {
        let local_visualization = w.local_visualization.map(TryInto::try_into).transpose()?;
        Ok(CaseResult {
            judge_result: w.judge_result,
            message: w.message,
            absolute_score: w.absolute_score,
            relative_score: w.relative_score,
            execution_time: w.execution_time,
            memory_usage: w.memory_usage,
            input_str: w.input_str,
            output_str: w.output_str,
            error_str: w.error_str,
            local_visualization,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResultWire {
    pub case_results: Vec<CaseResultWire>,
    pub resource_usage: ResourceUsage,
}

impl From<EvaluationResult> for EvaluationResultWire {
    fn from(r: EvaluationResult) -> Self {
        EvaluationResultWire {
            case_results: r.case_results.into_iter().map(Into::into).collect(),
            resource_usage: r.resource_usage,
        }
    }
}

impl TryFrom<EvaluationResultWire> for EvaluationResult {
    type Error = String;

    fn try_from(w: EvaluationResultWire) -> Result<Self, Self::Error> {
        let case_results = w
            .case_results
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EvaluationResult {
            case_results,
            resource_usage: w.resource_usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visualisation_round_trips_through_base64() {
        let original = Visualisation {
            media_type: "image/svg+xml".to_string(),
            bytes: b"<svg></svg>".to_vec(),
        };
        let wire: VisualisationWire = original.clone().into();
        let back: Visualisation = wire.try_into().unwrap();
        assert_eq!(original, back);
    }

    #[test]
    fn case_result_round_trips_through_wire_and_json() {
        let mut case = CaseResult::accepted(42, 1.0, 2048);
        case.local_visualization = Some(Visualisation {
            media_type: "image/svg+xml".to_string(),
            bytes: b"<svg/>".to_vec(),
        });
        let wire: CaseResultWire = case.clone().into();
        let json = serde_json::to_string(&wire).unwrap();
        let parsed: CaseResultWire = serde_json::from_str(&json).unwrap();
        let back: CaseResult = parsed.try_into().unwrap();
        assert_eq!(back.absolute_score, case.absolute_score);
        assert_eq!(
            back.local_visualization.unwrap().bytes,
            case.local_visualization.unwrap().bytes
        );
    }
}
