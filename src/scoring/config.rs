use serde::{Deserialize, Serialize};

pub const DEFAULT_OVERALL_CLOSE_WEIGHT: f64 = 0.50;
pub const DEFAULT_CAPTURE_WEIGHT: f64 = 0.35;
pub const DEFAULT_CATEGORY_CLOSE_WEIGHT: f64 = 0.15;
pub const DEFAULT_CAPTURE_CAP: f64 = 150.0;
pub const DEFAULT_MIN_CATEGORY_APPOINTMENTS: u32 = 2;
pub const DEFAULT_LEADER_MIN_APPOINTMENTS: u32 = 3;
pub const DEFAULT_LEADER_CLOSE_WEIGHT: f64 = 0.6;
pub const DEFAULT_LEADER_CAPTURE_WEIGHT: f64 = 0.4;
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Main scoring configuration.
///
/// Defines how a rep's composite score and the per-bucket leader scores are
/// calculated. Every field is optional; missing fields use the defaults.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   overall_close_weight: 0.5
///   capture_weight: 0.35
///   category_close_weight: 0.15
///   capture_cap: 150
///   leader_min_appointments: 3
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Weight of the Overall Close % term (default: 0.50)
    #[serde(default)]
    pub overall_close_weight: Option<f64>,

    /// Weight of the capped category capture term (default: 0.35)
    #[serde(default)]
    pub capture_weight: Option<f64>,

    /// Weight of the appointment-weighted category close term (default: 0.15)
    #[serde(default)]
    pub category_close_weight: Option<f64>,

    /// Capture rates above this are clamped (default: 150)
    #[serde(default)]
    pub capture_cap: Option<f64>,

    /// Appointments a bucket needs to count toward the score and to appear
    /// in its bucket table (default: 2)
    #[serde(default)]
    pub min_category_appointments: Option<u32>,

    /// Appointments a rep needs in a bucket to be named its leader (default: 3)
    #[serde(default)]
    pub leader_min_appointments: Option<u32>,

    /// Bucket score weight of the close rate (default: 0.6)
    #[serde(default)]
    pub leader_close_weight: Option<f64>,

    /// Bucket score weight of the capped capture rate (default: 0.4)
    #[serde(default)]
    pub leader_capture_weight: Option<f64>,

    /// Rows shown per bucket table (default: 10)
    #[serde(default)]
    pub leaderboard_size: Option<usize>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            overall_close_weight: Some(DEFAULT_OVERALL_CLOSE_WEIGHT),
            capture_weight: Some(DEFAULT_CAPTURE_WEIGHT),
            category_close_weight: Some(DEFAULT_CATEGORY_CLOSE_WEIGHT),
            capture_cap: Some(DEFAULT_CAPTURE_CAP),
            min_category_appointments: Some(DEFAULT_MIN_CATEGORY_APPOINTMENTS),
            leader_min_appointments: Some(DEFAULT_LEADER_MIN_APPOINTMENTS),
            leader_close_weight: Some(DEFAULT_LEADER_CLOSE_WEIGHT),
            leader_capture_weight: Some(DEFAULT_LEADER_CAPTURE_WEIGHT),
            leaderboard_size: Some(DEFAULT_LEADERBOARD_SIZE),
        }
    }
}

impl ScoringConfig {
    pub fn overall_close_weight(&self) -> f64 {
        self.overall_close_weight
            .unwrap_or(DEFAULT_OVERALL_CLOSE_WEIGHT)
    }

    pub fn capture_weight(&self) -> f64 {
        self.capture_weight.unwrap_or(DEFAULT_CAPTURE_WEIGHT)
    }

    pub fn category_close_weight(&self) -> f64 {
        self.category_close_weight
            .unwrap_or(DEFAULT_CATEGORY_CLOSE_WEIGHT)
    }

    pub fn capture_cap(&self) -> f64 {
        self.capture_cap.unwrap_or(DEFAULT_CAPTURE_CAP)
    }

    pub fn min_category_appointments(&self) -> u32 {
        self.min_category_appointments
            .unwrap_or(DEFAULT_MIN_CATEGORY_APPOINTMENTS)
    }

    pub fn leader_min_appointments(&self) -> u32 {
        self.leader_min_appointments
            .unwrap_or(DEFAULT_LEADER_MIN_APPOINTMENTS)
    }

    pub fn leader_close_weight(&self) -> f64 {
        self.leader_close_weight
            .unwrap_or(DEFAULT_LEADER_CLOSE_WEIGHT)
    }

    pub fn leader_capture_weight(&self) -> f64 {
        self.leader_capture_weight
            .unwrap_or(DEFAULT_LEADER_CAPTURE_WEIGHT)
    }

    pub fn leaderboard_size(&self) -> usize {
        self.leaderboard_size.unwrap_or(DEFAULT_LEADERBOARD_SIZE)
    }

    /// Clamp a capture rate to the configured cap
    pub fn cap_capture(&self, capture: f64) -> f64 {
        capture.min(self.capture_cap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_config() {
        let config = ScoringConfig::default();

        assert_eq!(config.overall_close_weight, Some(0.50));
        assert_eq!(config.capture_weight, Some(0.35));
        assert_eq!(config.category_close_weight, Some(0.15));
        assert_eq!(config.capture_cap, Some(150.0));
        assert_eq!(config.leaderboard_size, Some(10));
    }

    #[test]
    fn test_scoring_config_serde_roundtrip() {
        let config = ScoringConfig::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: ScoringConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_scoring_config_parse() {
        let yaml = r#"
overall_close_weight: 0.6
capture_weight: 0.25
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.overall_close_weight, Some(0.6));
        assert!(config.category_close_weight.is_none());
        // accessors fall back to defaults
        assert_eq!(config.category_close_weight(), 0.15);
        assert_eq!(config.leader_min_appointments(), 3);
    }

    #[test]
    fn test_empty_scoring_config_parse() {
        let yaml = "{}";
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert!(config.overall_close_weight.is_none());
        assert!(config.capture_cap.is_none());
        assert_eq!(config.capture_cap(), 150.0);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "base_score: 100";
        assert!(serde_saphyr::from_str::<ScoringConfig>(yaml).is_err());
    }

    #[test]
    fn test_cap_capture() {
        let config = ScoringConfig::default();
        assert_eq!(config.cap_capture(222.54), 150.0);
        assert_eq!(config.cap_capture(98.0), 98.0);
    }
}
