//! Standings, relative scoring, and rank→performance interpolation
//! (§3 "Standings"/"RelativeResults"/"RankPerformanceMap", §4.E).

use serde::{Deserialize, Serialize};

/// One expanded standings bucket: a score shared by every rank in
/// `[lo, hi]` inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bucket {
    score: i64,
    lo: u64,
    hi: u64,
}

/// Sorted immutable `[(rank, score)]` table with the final tuple having
/// score 0 (§3 "Standings").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standings {
    /// `(rank, score)` pairs, rank ascending, score descending.
    entries: Vec<(u64, i64)>,
}

impl Standings {
    /// Builds a `Standings` table, validating the invariants named in
    /// §3: ranks ascending, scores descending, all scores strictly
    /// positive except the last, whose rank is the participant count.
    pub fn new(entries: Vec<(u64, i64)>) -> Result<Self, String> {
        if entries.is_empty() {
            return Err("standings table must have at least one entry".to_string());
        }
        for pair in entries.windows(2) {
            let (r0, s0) = pair[0];
            let (r1, s1) = pair[1];
            if r1 <= r0 {
                return Err("ranks must be strictly ascending".to_string());
            }
            if s1 >= s0 {
                return Err("scores must be strictly descending".to_string());
            }
        }
        if entries.last().unwrap().1 != 0 {
            return Err("the last entry's score must be 0".to_string());
        }
        for &(_, score) in &entries[..entries.len() - 1] {
            if score <= 0 {
                return Err("every score but the last must be strictly positive".to_string());
            }
        }
        Ok(Standings { entries })
    }

    pub fn participant_count(&self) -> u64 {
        self.entries.last().unwrap().0
    }

    /// Expand ties into inclusive `[lo, hi]` rank buckets per score.
    fn buckets(&self) -> Vec<Bucket> {
        let mut buckets = Vec::with_capacity(self.entries.len());
        for (i, &(rank, score)) in self.entries.iter().enumerate() {
            let hi = match self.entries.get(i + 1) {
                Some(&(next_rank, _)) => next_rank - 1,
                None => rank,
            };
            buckets.push(Bucket { score, lo: rank, hi });
        }
        buckets
    }

    /// §4.E "Rank computation from an absolute overall score": returns
    /// `(integer_rank, fractional_rank)`. A score above every table
    /// entry yields rank 1, fractional rank 1.0.
    pub fn rank_for_score(&self, score: i64) -> (u64, f64) {
        let buckets = self.buckets();
        let best = buckets.first().unwrap();
        if score > best.score {
            return (1, 1.0);
        }
        let bucket = buckets
            .iter()
            .filter(|b| b.score <= score)
            .max_by_key(|b| b.score)
            .unwrap_or(best);
        let fractional = if bucket.score == score {
            (bucket.lo + bucket.hi) as f64 / 2.0
        } else {
            bucket.lo as f64
        };
        (bucket.lo, fractional)
    }
}

/// How a participant's per-case absolute score is normalised against the
/// field (§3 "RelativeResults").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativeScoreType {
    Max,
    Min,
    RankMax,
    RankMin,
}

/// Per-case absolute-score table over all historical submissions, plus
/// the cap each case contributes (§3 "RelativeResults").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelativeResults {
    /// `historical_scores[case_idx]` is every historical participant's
    /// raw absolute score on that case. A negative value marks a
    /// participant as non-participating on that case.
    pub historical_scores: Vec<Vec<i64>>,
    pub score_type: RelativeScoreType,
    pub relative_max_score: f64,
}

/// The candidate's recomputed relative scores plus their rank among the
/// full (historical + candidate) field.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeEvaluation {
    pub per_case: Vec<f64>,
    pub overall: f64,
    pub rank: u64,
    pub fractional_rank: f64,
    pub total_participants: u64,
}

impl RelativeResults {
    fn is_valid(&self, score: i64) -> bool {
        match self.score_type {
            RelativeScoreType::Max | RelativeScoreType::RankMax => score >= 0,
            RelativeScoreType::Min | RelativeScoreType::RankMin => score > 0,
        }
    }

    /// The per-case relative value for `subject_score`, where the
    /// max/min denominator (or the rank field, for the RANK_* variants)
    /// is computed over every valid historical score on that case plus
    /// `candidate_score` — this is what makes the top performer receive
    /// exactly `relative_max_score` (invariant 8) even when the
    /// candidate itself sets the new extreme.
    fn relative_value(&self, case_idx: usize, subject_score: i64, candidate_score: i64) -> f64 {
        if !self.is_valid(subject_score) {
            return 0.0;
        }
        let historical = self.historical_scores.get(case_idx).map(Vec::as_slice).unwrap_or(&[]);
        let mut field: Vec<i64> = historical.iter().copied().filter(|&v| self.is_valid(v)).collect();
        if self.is_valid(candidate_score) {
            field.push(candidate_score);
        }
        if field.is_empty() {
            return 0.0;
        }
        match self.score_type {
            RelativeScoreType::Max => {
                let denom = *field.iter().max().unwrap();
                if denom <= 0 {
                    0.0
                } else {
                    (self.relative_max_score * subject_score as f64 / denom as f64)
                        .min(self.relative_max_score)
                }
            }
            RelativeScoreType::Min => {
                let denom = *field.iter().min().unwrap();
                (self.relative_max_score * denom as f64 / subject_score as f64)
                    .min(self.relative_max_score)
            }
            RelativeScoreType::RankMax | RelativeScoreType::RankMin => {
                let fraction = fractional_fraction(
                    &field,
                    subject_score,
                    self.score_type == RelativeScoreType::RankMax,
                );
                self.relative_max_score * fraction
            }
        }
    }

    /// §3/§4.E: recompute the candidate's per-case relative scores and
    /// locate their rank among the full field (historical participants
    /// plus the candidate, appended).
    pub fn evaluate(&self, new_case_scores: &[i64]) -> RelativeEvaluation {
        let num_cases = self.historical_scores.len();
        let num_historical = self.historical_scores.first().map(Vec::len).unwrap_or(0);

        let per_case: Vec<f64> = new_case_scores
            .iter()
            .enumerate()
            .map(|(case_idx, &score)| self.relative_value(case_idx, score, score))
            .collect();
        let overall: f64 = per_case.iter().sum();

        let mut totals: Vec<f64> = (0..num_historical)
            .map(|participant| {
                (0..num_cases)
                    .map(|case_idx| {
                        let subject = self.historical_scores[case_idx][participant];
                        let candidate = new_case_scores.get(case_idx).copied().unwrap_or(-1);
                        self.relative_value(case_idx, subject, candidate)
                    })
                    .sum()
            })
            .collect();
        totals.push(overall);
        totals.sort_by(|a, b| b.partial_cmp(a).unwrap());

        let total_participants = totals.len() as u64;
        let candidate_position = totals
            .iter()
            .position(|&t| (t - overall).abs() < 1e-9)
            .unwrap_or(totals.len() - 1);
        let tied_lo = totals
            .iter()
            .position(|&t| (t - totals[candidate_position]).abs() < 1e-9)
            .unwrap() as u64
            + 1;
        let tied_hi = totals.len() as u64
            - totals
                .iter()
                .rev()
                .position(|&t| (t - totals[candidate_position]).abs() < 1e-9)
                .unwrap() as u64;
        let fractional_rank = (tied_lo + tied_hi) as f64 / 2.0;

        RelativeEvaluation {
            per_case,
            overall,
            rank: tied_lo,
            fractional_rank,
            total_participants,
        }
    }
}

/// Ties broken by averaging the tied ranks (the conventional "rank,
/// method=average" scheme), normalised to `[0, 1]` with the best
/// performer mapped to `1.0` and the worst to `0.0`.
fn fractional_fraction(field: &[i64], subject: i64, higher_is_better: bool) -> f64 {
    let n = field.len();
    if n <= 1 {
        return 1.0;
    }
    let better_count = field
        .iter()
        .filter(|&&v| if higher_is_better { v > subject } else { v < subject })
        .count();
    let tied_count = field.iter().filter(|&&v| v == subject).count();
    // Average 1-indexed rank across the tied block, descending-quality order.
    let rank = better_count as f64 + (tied_count as f64 + 1.0) / 2.0;
    1.0 - (rank - 1.0) / (n as f64 - 1.0)
}

/// Sorted `[(rank, performance)]` anchors, rank ascending, performance
/// descending, with at least two entries (§3 "RankPerformanceMap").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankPerformanceMap {
    anchors: Vec<(f64, f64)>,
}

impl RankPerformanceMap {
    pub fn new(anchors: Vec<(f64, f64)>) -> Result<Self, String> {
        if anchors.len() < 2 {
            return Err("RankPerformanceMap needs at least 2 anchors".to_string());
        }
        for pair in anchors.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err("anchor ranks must be strictly ascending".to_string());
            }
            if pair[1].1 >= pair[0].1 {
                return Err("anchor performances must be strictly descending".to_string());
            }
        }
        Ok(RankPerformanceMap { anchors })
    }

    /// §4.E "Rank → performance": piecewise-linear interpolation between
    /// adjacent anchors, with the `rank = 1.0` extrapolation resolved in
    /// DESIGN.md (Open Question 1): one further gap-width past the first
    /// two anchors.
    pub fn get_performance(&self, rank: f64) -> Result<f64, String> {
        let last_rank = self.anchors.last().unwrap().0;
        if rank < 1.0 || rank > last_rank {
            return Err(format!("rank {rank} is outside [1, {last_rank}]"));
        }
        if let Some(&(_, perf)) = self.anchors.iter().find(|(r, _)| (*r - rank).abs() < 1e-9) {
            return Ok(perf);
        }
        if rank < self.anchors[0].0 {
            let (r1, p1) = self.anchors[0];
            let (r2, p2) = self.anchors[1];
            let slope = (p1 - p2) / (r2 - r1);
            return Ok(p1 + slope * (r1 - rank));
        }
        let window = self
            .anchors
            .windows(2)
            .find(|w| w[0].0 < rank && rank < w[1].0)
            .expect("rank already checked to be within range and not on an anchor");
        let (r_lo, p_lo) = window[0];
        let (r_hi, p_hi) = window[1];
        let t = (rank - r_lo) / (r_hi - r_lo);
        Ok(p_lo + t * (p_hi - p_lo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standings_with_ties_scenario() {
        let standings =
            Standings::new(vec![(1, 100), (2, 98), (4, 96), (8, 94), (16, 0)]).unwrap();
        assert_eq!(standings.rank_for_score(96), (4, 5.5));
        assert_eq!(standings.rank_for_score(200), (1, 1.0));
        assert_eq!(standings.participant_count(), 16);
    }

    #[test]
    fn rank_performance_interpolation_scenario() {
        let map = RankPerformanceMap::new(vec![
            (1.0, 3200.0),
            (2.0, 2800.0),
            (3.0, 2000.0),
            (4.0, 200.0),
        ])
        .unwrap();
        assert_eq!(map.get_performance(3.5).unwrap(), 1100.0);
        assert_eq!(map.get_performance(1.0).unwrap(), 3200.0);
        assert_eq!(map.get_performance(4.0).unwrap(), 200.0);
    }

    #[test]
    fn rank_performance_rejects_out_of_range_rank() {
        let map = RankPerformanceMap::new(vec![(1.0, 100.0), (2.0, 0.0)]).unwrap();
        assert!(map.get_performance(0.5).is_err());
        assert!(map.get_performance(2.1).is_err());
    }

    #[test]
    fn relative_max_scenario() {
        // Matches the per-case/overall numbers of the worked MAX example
        // with a 2-row historical field rather than a literal transcription
        // of its participant count.
        let results = RelativeResults {
            historical_scores: vec![
                vec![100, 200], // case 0
                vec![200, 400], // case 1
            ],
            score_type: RelativeScoreType::Max,
            relative_max_score: 1000.0,
        };
        let eval = results.evaluate(&[400, 300]);
        assert_eq!(eval.per_case, vec![1000.0, 750.0]);
        assert_eq!(eval.overall, 1750.0);
        assert_eq!(eval.rank, 1);
        assert_eq!(eval.total_participants, 3);
    }

    #[test]
    fn relative_max_top_performer_gets_exactly_the_cap() {
        let results = RelativeResults {
            historical_scores: vec![vec![10, 20, 30]],
            score_type: RelativeScoreType::Max,
            relative_max_score: 500.0,
        };
        let eval = results.evaluate(&[1000]);
        assert_eq!(eval.per_case, vec![500.0]);
    }

    #[test]
    fn relative_min_monotone_and_capped() {
        let results = RelativeResults {
            historical_scores: vec![vec![10, 20, 30]],
            score_type: RelativeScoreType::Min,
            relative_max_score: 500.0,
        };
        let best = results.evaluate(&[5]).per_case[0];
        let worse = results.evaluate(&[50]).per_case[0];
        assert_eq!(best, 500.0);
        assert!(worse < best);
    }
}
