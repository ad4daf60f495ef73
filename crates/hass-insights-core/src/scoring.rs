//! Score aggregation and winner selection.
//!
//! Judge scores are untrusted model output. Aggregation is the hardening
//! boundary: anything that does not coerce to a finite number is ignored and
//! never fails the run.

use serde_json::Value;

use crate::domain::{Candidate, InsightError, JudgeVerdict, Result};

/// Coerce a raw judge score into a finite number.
///
/// Numbers and numeric strings are accepted; `null`, booleans, non-numeric
/// strings, arrays and objects are not. Out-of-range values are kept as-is.
pub fn coerce_score(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

/// Mean of all valid scores; `0.0` if there are none.
///
/// Kept as a running mean so large out-of-range scores cannot overflow an
/// intermediate sum.
pub fn aggregate_score(verdicts: &[JudgeVerdict]) -> f64 {
    verdicts
        .iter()
        .filter_map(|v| coerce_score(&v.raw_score))
        .enumerate()
        .fold(0.0, |mean, (i, score)| mean + (score - mean) / (i + 1) as f64)
}

/// Index of the candidate with the highest aggregate score.
///
/// Linear scan with strict greater-than, so the earliest candidate wins ties.
pub fn select_best_index(candidates: &[Candidate]) -> Result<usize> {
    let (first, rest) = candidates.split_first().ok_or(InsightError::EmptyInput)?;

    let mut best = (0, first.aggregate_score);
    for (offset, candidate) in rest.iter().enumerate() {
        if candidate.aggregate_score > best.1 {
            best = (offset + 1, candidate.aggregate_score);
        }
    }
    Ok(best.0)
}

/// The candidate with the highest aggregate score (first wins ties).
pub fn select_best(candidates: &[Candidate]) -> Result<&Candidate> {
    select_best_index(candidates).map(|index| &candidates[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn verdicts(scores: Vec<Value>) -> Vec<JudgeVerdict> {
        scores
            .into_iter()
            .enumerate()
            .map(|(i, s)| JudgeVerdict::new(&format!("judge-{i}"), "eval", s))
            .collect()
    }

    fn candidate(score: f64) -> Candidate {
        Candidate {
            text: format!("candidate scoring {score}"),
            verdicts: vec![],
            aggregate_score: score,
        }
    }

    #[test]
    fn test_mean_skips_non_numeric_scores() {
        let v = verdicts(vec![json!(8), json!("7"), json!("bad"), Value::Null]);
        assert_eq!(aggregate_score(&v), 7.5);
    }

    #[test]
    fn test_empty_or_all_invalid_is_zero() {
        assert_eq!(aggregate_score(&[]), 0.0);
        let v = verdicts(vec![json!("n/a"), json!(true), json!([9]), json!({"score": 9})]);
        assert_eq!(aggregate_score(&v), 0.0);
    }

    #[test]
    fn test_out_of_range_scores_still_count() {
        let v = verdicts(vec![json!(12), json!(-2)]);
        assert_eq!(aggregate_score(&v), 5.0);
    }

    #[test]
    fn test_mean_of_huge_scores_stays_finite() {
        let score = aggregate_score(&verdicts(vec![json!(1e308), json!(1e308)]));
        assert!(score.is_finite());
        assert_eq!(score, 1e308);
    }

    #[test]
    fn test_coerce_score() {
        assert_eq!(coerce_score(&json!(6.5)), Some(6.5));
        assert_eq!(coerce_score(&json!(" 9 ")), Some(9.0));
        assert_eq!(coerce_score(&json!("NaN")), None);
        assert_eq!(coerce_score(&json!("Infinity")), None);
        assert_eq!(coerce_score(&json!("")), None);
        assert_eq!(coerce_score(&Value::Null), None);
    }

    #[test]
    fn test_select_best_first_of_tied_maximum() {
        let candidates: Vec<_> = [6.0, 9.0, 9.0, 3.0].into_iter().map(candidate).collect();
        assert_eq!(select_best_index(&candidates).unwrap(), 1);
        assert_eq!(select_best(&candidates).unwrap(), &candidates[1]);
    }

    #[test]
    fn test_select_best_single_and_all_zero() {
        let one = vec![candidate(0.0)];
        assert_eq!(select_best_index(&one).unwrap(), 0);

        let zeros: Vec<_> = [0.0, 0.0, 0.0].into_iter().map(candidate).collect();
        assert_eq!(select_best_index(&zeros).unwrap(), 0);
    }

    #[test]
    fn test_select_best_empty_is_explicit_error() {
        assert!(matches!(select_best(&[]), Err(InsightError::EmptyInput)));
    }
}
