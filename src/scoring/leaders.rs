use serde::Serialize;
use std::cmp::Ordering;

use super::config::ScoringConfig;
use crate::model::{CategoryStats, SalesRep, UnitBucket};

/// One rep's standing within a single bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketEntry {
    pub rank: usize,
    pub name: String,
    pub stats: CategoryStats,
    pub bucket_score: f64,
}

/// Score used to compare reps inside one bucket
pub fn bucket_score(stats: &CategoryStats, config: &ScoringConfig) -> f64 {
    let close = stats.close_rate.unwrap_or(0.0);
    let capture = config.cap_capture(stats.capture_rate.unwrap_or(0.0));
    close * config.leader_close_weight() + capture * config.leader_capture_weight()
}

fn eligible<'a>(
    reps: &'a [SalesRep],
    bucket: UnitBucket,
    min_appts: u32,
    config: &'a ScoringConfig,
) -> impl Iterator<Item = (&'a SalesRep, CategoryStats, f64)> + 'a {
    reps.iter().filter_map(move |rep| {
        let stats = rep.category(bucket);
        stats
            .is_rankable(min_appts)
            .then(|| (rep, stats, bucket_score(&stats, config)))
    })
}

/// Best rep in every bucket, `None` when nobody has enough appointments yet.
/// On equal bucket scores the earlier rep wins.
pub fn category_leaders(
    reps: &[SalesRep],
    config: &ScoringConfig,
) -> Vec<(UnitBucket, Option<BucketEntry>)> {
    UnitBucket::ALL
        .into_iter()
        .map(|bucket| {
            let mut best: Option<(&SalesRep, CategoryStats, f64)> = None;
            for candidate in eligible(reps, bucket, config.leader_min_appointments(), config) {
                if best.as_ref().map_or(true, |b| candidate.2 > b.2) {
                    best = Some(candidate);
                }
            }
            let leader = best.map(|(rep, stats, score)| BucketEntry {
                rank: 1,
                name: rep.name.clone(),
                stats,
                bucket_score: score,
            });
            (bucket, leader)
        })
        .collect()
}

/// Top reps within one bucket, best first
pub fn category_rankings(
    reps: &[SalesRep],
    bucket: UnitBucket,
    config: &ScoringConfig,
) -> Vec<BucketEntry> {
    let mut entries: Vec<(&SalesRep, CategoryStats, f64)> =
        eligible(reps, bucket, config.min_category_appointments(), config).collect();
    entries.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));

    entries
        .into_iter()
        .take(config.leaderboard_size())
        .enumerate()
        .map(|(idx, (rep, stats, score))| BucketEntry {
            rank: idx + 1,
            name: rep.name.clone(),
            stats,
            bucket_score: score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_reps;

    fn leader_name(leaders: &[(UnitBucket, Option<BucketEntry>)], bucket: UnitBucket) -> Option<String> {
        leaders
            .iter()
            .find(|(b, _)| *b == bucket)
            .and_then(|(_, l)| l.as_ref().map(|l| l.name.clone()))
    }

    #[test]
    fn test_bucket_score() {
        let config = ScoringConfig::default();
        let stats = CategoryStats {
            appointments: 9,
            close_rate: Some(22.22),
            capture_rate: Some(222.54),
        };
        // 22.22*0.6 + 150*0.4
        assert!((bucket_score(&stats, &config) - 73.332).abs() < 1e-9);

        let no_capture = CategoryStats {
            appointments: 1,
            close_rate: Some(50.0),
            capture_rate: None,
        };
        assert!((bucket_score(&no_capture, &config) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_leaders() {
        let leaders = category_leaders(&sample_reps(), &ScoringConfig::default());
        assert_eq!(leaders.len(), 5);
        // 0-4: Gabriel 73.33, Derek 77.44, Craig 89.6
        assert_eq!(
            leader_name(&leaders, UnitBucket::Small).as_deref(),
            Some("Craig Chisman")
        );
        // 18-25: Craig has only 2 appointments
        assert_eq!(
            leader_name(&leaders, UnitBucket::ExtraLarge).as_deref(),
            Some("Gabriel Grimm")
        );
        // 26+: Gabriel is the only rep with 3+ appointments and a close rate
        assert_eq!(
            leader_name(&leaders, UnitBucket::Mega).as_deref(),
            Some("Gabriel Grimm")
        );
    }

    #[test]
    fn test_no_leader_without_data() {
        let mut reps = sample_reps();
        for rep in &mut reps {
            rep.categories.insert(UnitBucket::Mega, CategoryStats::default());
        }
        let leaders = category_leaders(&reps, &ScoringConfig::default());
        assert_eq!(leader_name(&leaders, UnitBucket::Mega), None);
    }

    #[test]
    fn test_leader_tie_first_wins() {
        let mut a = SalesRep::new("First");
        let mut b = SalesRep::new("Second");
        let stats = CategoryStats {
            appointments: 5,
            close_rate: Some(40.0),
            capture_rate: Some(100.0),
        };
        a.categories.insert(UnitBucket::Large, stats);
        b.categories.insert(UnitBucket::Large, stats);
        let leaders = category_leaders(&[a, b], &ScoringConfig::default());
        assert_eq!(
            leader_name(&leaders, UnitBucket::Large).as_deref(),
            Some("First")
        );
    }

    #[test]
    fn test_category_rankings() {
        let config = ScoringConfig::default();
        let reps = sample_reps();

        let medium = category_rankings(&reps, UnitBucket::Medium, &config);
        // Gabriel's 5-9 close rate is zero
        assert_eq!(medium.len(), 2);
        assert_eq!(medium[0].rank, 1);
        assert!(medium[0].bucket_score >= medium[1].bucket_score);

        // Craig's 2 appointments are enough for the table but not for the card
        let xl = category_rankings(&reps, UnitBucket::ExtraLarge, &config);
        assert_eq!(xl.len(), 3);
    }

    #[test]
    fn test_category_rankings_truncated() {
        let config = ScoringConfig {
            leaderboard_size: Some(1),
            ..ScoringConfig::default()
        };
        let small = category_rankings(&sample_reps(), UnitBucket::Small, &config);
        assert_eq!(small.len(), 1);
        assert_eq!(small[0].name, "Craig Chisman");
    }
}
