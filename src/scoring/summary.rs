use serde::Serialize;

use super::config::ScoringConfig;
use super::engine::RankedRep;
use crate::model::SalesRep;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformer {
    pub first_name: String,
    pub score: f64,
}

/// Team-wide quick stats
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_reps: usize,
    pub avg_close: f64,
    pub avg_capture: f64,
    pub top_performer: Option<TopPerformer>,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Averages skip reps that have no value for the metric; overall capture is
/// capped per rep before averaging.
pub fn summary(reps: &[SalesRep], ranked: &[RankedRep], config: &ScoringConfig) -> Summary {
    Summary {
        total_reps: reps.len(),
        avg_close: mean(reps.iter().filter_map(|r| r.overall_close)),
        avg_capture: mean(
            reps.iter()
                .filter_map(|r| r.overall_capture)
                .map(|c| config.cap_capture(c)),
        ),
        top_performer: ranked.first().map(|r| TopPerformer {
            first_name: r.rep.first_name().to_string(),
            score: r.result.score,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_reps;
    use crate::scoring::engine::rank_reps;

    #[test]
    fn test_sample_summary() {
        let config = ScoringConfig::default();
        let reps = sample_reps();
        let ranked = rank_reps(&reps, &config);
        let s = summary(&reps, &ranked, &config);

        assert_eq!(s.total_reps, 3);
        assert!((s.avg_close - (31.25 + 38.46 + 44.83) / 3.0).abs() < 1e-9);
        assert!((s.avg_capture - (94.20 + 107.17 + 98.0) / 3.0).abs() < 1e-9);
        let top = s.top_performer.unwrap();
        assert_eq!(top.first_name, "Craig");
        assert!((top.score - 71.89189).abs() < 1e-3);
    }

    #[test]
    fn test_summary_caps_capture() {
        let mut rep = SalesRep::new("Over Achiever");
        rep.overall_capture = Some(400.0);
        let config = ScoringConfig::default();
        let s = summary(&[rep], &[], &config);
        assert_eq!(s.avg_capture, 150.0);
        assert_eq!(s.avg_close, 0.0);
        assert!(s.top_performer.is_none());
    }

    #[test]
    fn test_empty_summary() {
        let s = summary(&[], &[], &ScoringConfig::default());
        assert_eq!(s.total_reps, 0);
        assert_eq!(s.avg_close, 0.0);
        assert_eq!(s.avg_capture, 0.0);
        assert!(s.top_performer.is_none());
    }
}
