use serde::Serialize;
use std::cmp::Ordering;

use super::config::ScoringConfig;
use crate::model::{SalesRep, UnitBucket};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub label: String,       // e.g. "Overall Close", "Capture", "Category Close"
    pub description: String, // e.g. "44.8% x 0.50"
    pub input: f64,          // Value fed into the term
    pub weight: f64,
    pub before: f64, // Score before this term
    pub after: f64,  // Score after this term
}

impl FactorContribution {
    pub fn contribution(&self) -> f64 {
        self.after - self.before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub factors: Vec<FactorContribution>,
    /// Buckets that counted toward the category averages
    pub valid_buckets: Vec<UnitBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: f64,
    /// Overall close or overall capture was missing from the input
    pub incomplete: bool,
    pub avg_category_close: f64,
    /// Appointment-weighted capture before the cap is applied
    pub avg_category_capture: f64,
    pub valid_categories: usize,
    #[serde(skip)]
    pub breakdown: ScoreBreakdown,
}

/// A scored rep with its position in the ranking
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRep {
    pub rank: usize,
    pub rep: SalesRep,
    pub result: ScoreResult,
}

/// Minimum-appointment filter presets, cycled in the dashboard
pub const MIN_APPOINTMENT_PRESETS: [u32; 4] = [0, 10, 20, 25];
pub const DEFAULT_MIN_APPOINTMENTS: u32 = 10;

/// Next preset after `current`, wrapping around
pub fn next_min_appointments(current: u32) -> u32 {
    MIN_APPOINTMENT_PRESETS
        .iter()
        .copied()
        .find(|p| *p > current)
        .unwrap_or(MIN_APPOINTMENT_PRESETS[0])
}

pub fn calculate_score(rep: &SalesRep, config: &ScoringConfig) -> ScoreResult {
    let min_appts = config.min_category_appointments();

    let mut valid_buckets = Vec::new();
    let mut weighted_close = 0.0;
    let mut weighted_capture = 0.0;
    let mut total_weight = 0.0;
    for bucket in UnitBucket::ALL {
        let stats = rep.category(bucket);
        if !stats.is_rankable(min_appts) {
            continue;
        }
        let weight = stats.appointments as f64;
        weighted_close += stats.close_rate.unwrap_or(0.0) * weight;
        weighted_capture += stats.capture_rate.unwrap_or(0.0) * weight;
        total_weight += weight;
        valid_buckets.push(bucket);
    }

    let (avg_category_close, avg_category_capture) = if total_weight > 0.0 {
        (weighted_close / total_weight, weighted_capture / total_weight)
    } else {
        (0.0, 0.0)
    };
    let capture = config.cap_capture(avg_category_capture);
    let overall_close = rep.overall_close.unwrap_or(0.0);

    let terms = [
        (
            "Overall Close",
            overall_close,
            config.overall_close_weight(),
            match rep.overall_close {
                Some(c) => format!("{:.1}% overall close", c),
                None => "no overall close, counted as 0".to_string(),
            },
        ),
        (
            "Capture",
            capture,
            config.capture_weight(),
            if avg_category_capture > capture {
                format!(
                    "{:.0}% category capture, capped at {:.0}%",
                    avg_category_capture,
                    config.capture_cap()
                )
            } else {
                format!("{:.0}% category capture", capture)
            },
        ),
        (
            "Category Close",
            avg_category_close,
            config.category_close_weight(),
            format!(
                "{:.1}% across {} bucket(s)",
                avg_category_close,
                valid_buckets.len()
            ),
        ),
    ];

    let mut score = 0.0;
    let mut factors = Vec::with_capacity(terms.len());
    for (label, input, weight, detail) in terms {
        let before = score;
        score += input * weight;
        factors.push(FactorContribution {
            label: label.to_string(),
            description: format!("{} x {:.2}", detail, weight),
            input,
            weight,
            before,
            after: score,
        });
    }

    ScoreResult {
        score,
        incomplete: rep.overall_close.is_none() || rep.overall_capture.is_none(),
        avg_category_close,
        avg_category_capture,
        valid_categories: valid_buckets.len(),
        breakdown: ScoreBreakdown {
            factors,
            valid_buckets,
        },
    }
}

/// Score every rep and sort: score descending, then total appointments
/// descending, then input order.
pub fn rank_reps(reps: &[SalesRep], config: &ScoringConfig) -> Vec<RankedRep> {
    let mut scored: Vec<(SalesRep, ScoreResult)> = reps
        .iter()
        .map(|rep| (rep.clone(), calculate_score(rep, config)))
        .collect();

    // sort_by is stable, so equal entries keep input order
    scored.sort_by(|a, b| {
        b.1.score
            .partial_cmp(&a.1.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.0.total_appts.cmp(&a.0.total_appts))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (rep, result))| RankedRep {
            rank: idx + 1,
            rep,
            result,
        })
        .collect()
}

/// Keep reps with at least `min_appts` total appointments, re-numbering ranks
pub fn filter_by_min_appointments(ranked: &[RankedRep], min_appts: u32) -> Vec<RankedRep> {
    ranked
        .iter()
        .filter(|r| r.rep.total_appts >= min_appts)
        .enumerate()
        .map(|(idx, r)| RankedRep {
            rank: idx + 1,
            ..r.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CategoryStats;
    use crate::sample::sample_reps;

    fn rep_with(
        name: &str,
        total: u32,
        close: Option<f64>,
        capture: Option<f64>,
        buckets: &[(UnitBucket, u32, Option<f64>, Option<f64>)],
    ) -> SalesRep {
        let mut rep = SalesRep::new(name);
        rep.total_appts = total;
        rep.overall_close = close;
        rep.overall_capture = capture;
        for (bucket, appts, close, capture) in buckets {
            rep.categories.insert(
                *bucket,
                CategoryStats {
                    appointments: *appts,
                    close_rate: *close,
                    capture_rate: *capture,
                },
            );
        }
        rep
    }

    #[test]
    fn test_sample_scores() {
        let config = ScoringConfig::default();
        let reps = sample_reps();

        let gabriel = calculate_score(&reps[0], &config);
        assert_eq!(gabriel.valid_categories, 4); // 5-9 has a zero close rate
        assert!((gabriel.avg_category_close - 1000.0 / 30.0).abs() < 1e-9);
        assert!((gabriel.score - 65.60187).abs() < 1e-3);

        let craig = calculate_score(&reps[2], &config);
        assert_eq!(craig.valid_categories, 4); // 26+ has a single appointment
        assert!((craig.score - 71.89189).abs() < 1e-3);
        assert!(!craig.incomplete);
    }

    #[test]
    fn test_capture_is_capped() {
        let rep = rep_with(
            "Capped",
            10,
            Some(40.0),
            Some(200.0),
            &[(UnitBucket::Small, 4, Some(50.0), Some(300.0))],
        );
        let result = calculate_score(&rep, &ScoringConfig::default());
        assert_eq!(result.avg_category_capture, 300.0);
        // 40*0.5 + 150*0.35 + 50*0.15
        assert!((result.score - 80.0).abs() < 1e-9);
        assert!(result.breakdown.factors[1].description.contains("capped"));
    }

    #[test]
    fn test_no_valid_buckets_no_division() {
        let rep = rep_with(
            "New Hire",
            1,
            Some(100.0),
            None,
            &[(UnitBucket::Small, 1, Some(100.0), Some(100.0))],
        );
        let result = calculate_score(&rep, &ScoringConfig::default());
        assert_eq!(result.valid_categories, 0);
        assert_eq!(result.avg_category_close, 0.0);
        assert_eq!(result.avg_category_capture, 0.0);
        assert!((result.score - 50.0).abs() < 1e-9);
        assert!(result.incomplete);
    }

    #[test]
    fn test_missing_overall_close_counts_as_zero() {
        let rep = rep_with(
            "No Close",
            5,
            None,
            Some(90.0),
            &[(UnitBucket::Medium, 5, Some(20.0), None)],
        );
        let result = calculate_score(&rep, &ScoringConfig::default());
        // missing capture counts as 0: 0*0.5 + 0*0.35 + 20*0.15
        assert!((result.score - 3.0).abs() < 1e-9);
        assert!(result.incomplete);
        assert!(result.score.is_finite());
    }

    #[test]
    fn test_breakdown_sums_to_score() {
        let reps = sample_reps();
        let result = calculate_score(&reps[1], &ScoringConfig::default());
        let factors = &result.breakdown.factors;
        assert_eq!(factors.len(), 3);
        assert_eq!(factors[0].before, 0.0);
        assert!((factors[2].after - result.score).abs() < 1e-9);
        let total: f64 = factors.iter().map(|f| f.contribution()).sum();
        assert!((total - result.score).abs() < 1e-9);
        assert_eq!(result.breakdown.valid_buckets.len(), 4);
    }

    #[test]
    fn test_rank_reps_order() {
        let ranked = rank_reps(&sample_reps(), &ScoringConfig::default());
        let names: Vec<&str> = ranked.iter().map(|r| r.rep.name.as_str()).collect();
        assert_eq!(names, vec!["Craig Chisman", "Gabriel Grimm", "Derek Kingry"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_rank_ties_by_appointments_then_input_order() {
        let a = rep_with("A", 10, Some(40.0), Some(100.0), &[]);
        let b = rep_with("B", 20, Some(40.0), Some(100.0), &[]);
        let c = rep_with("C", 10, Some(40.0), Some(100.0), &[]);
        let ranked = rank_reps(&[a, b, c], &ScoringConfig::default());
        let names: Vec<&str> = ranked.iter().map(|r| r.rep.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_filter_renumbers_ranks() {
        let ranked = rank_reps(&sample_reps(), &ScoringConfig::default());
        let filtered = filter_by_min_appointments(&ranked, 30);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].rep.name, "Gabriel Grimm");
        assert_eq!(filtered[0].rank, 1);
        assert_eq!(filtered[1].rank, 2);

        assert_eq!(filter_by_min_appointments(&ranked, 0).len(), 3);
        assert!(filter_by_min_appointments(&ranked, 100).is_empty());
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank_reps(&[], &ScoringConfig::default()).is_empty());
    }

    #[test]
    fn test_next_min_appointments() {
        assert_eq!(next_min_appointments(0), 10);
        assert_eq!(next_min_appointments(10), 20);
        assert_eq!(next_min_appointments(25), 0);
        assert_eq!(next_min_appointments(15), 20);
    }
}
