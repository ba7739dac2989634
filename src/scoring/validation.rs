use super::config::ScoringConfig;

const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

fn check_weight(errors: &mut Vec<String>, field: &str, value: Option<f64>) {
    if let Some(w) = value {
        if !w.is_finite() || w < 0.0 {
            errors.push(format!(
                "scoring.{}: must be a non-negative number (got {})",
                field, w
            ));
        }
    }
}

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    check_weight(&mut errors, "overall_close_weight", config.overall_close_weight);
    check_weight(&mut errors, "capture_weight", config.capture_weight);
    check_weight(&mut errors, "category_close_weight", config.category_close_weight);
    check_weight(&mut errors, "leader_close_weight", config.leader_close_weight);
    check_weight(&mut errors, "leader_capture_weight", config.leader_capture_weight);

    let composite =
        config.overall_close_weight() + config.capture_weight() + config.category_close_weight();
    if (composite - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        errors.push(format!(
            "scoring: overall_close_weight + capture_weight + category_close_weight must sum to 1.0 (got {:.3})",
            composite
        ));
    }

    let leader = config.leader_close_weight() + config.leader_capture_weight();
    if (leader - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        errors.push(format!(
            "scoring: leader_close_weight + leader_capture_weight must sum to 1.0 (got {:.3})",
            leader
        ));
    }

    if let Some(cap) = config.capture_cap {
        if !cap.is_finite() || cap <= 0.0 {
            errors.push(format!("scoring.capture_cap: must be positive (got {})", cap));
        }
    }

    if config.leaderboard_size == Some(0) {
        errors.push("scoring.leaderboard_size: must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
