use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unit-count bucket used to segment category leaderboards.
///
/// Serialized with its label ("0-4", "5-9", ...) so that converted JSON keeps
/// the same keys as the spreadsheet column prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitBucket {
    #[serde(rename = "0-4")]
    Small,
    #[serde(rename = "5-9")]
    Medium,
    #[serde(rename = "10-17")]
    Large,
    #[serde(rename = "18-25")]
    ExtraLarge,
    #[serde(rename = "26+")]
    Mega,
}

impl UnitBucket {
    /// All buckets in display order
    pub const ALL: [UnitBucket; 5] = [
        UnitBucket::Small,
        UnitBucket::Medium,
        UnitBucket::Large,
        UnitBucket::ExtraLarge,
        UnitBucket::Mega,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            UnitBucket::Small => "0-4",
            UnitBucket::Medium => "5-9",
            UnitBucket::Large => "10-17",
            UnitBucket::ExtraLarge => "18-25",
            UnitBucket::Mega => "26+",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            UnitBucket::Small => "Small Jobs (0-4 Units)",
            UnitBucket::Medium => "Medium Jobs (5-9 Units)",
            UnitBucket::Large => "Large Jobs (10-17 Units)",
            UnitBucket::ExtraLarge => "Extra Large Jobs (18-25 Units)",
            UnitBucket::Mega => "Mega Jobs (26+ Units)",
        }
    }

    pub fn appointments_column(&self) -> String {
        format!("({}) Issued Appts", self.label())
    }

    pub fn close_column(&self) -> String {
        format!("({}) Overall Close %", self.label())
    }

    pub fn capture_column(&self) -> String {
        format!("({}) Units Captured on Sold Jobs %", self.label())
    }
}

impl fmt::Display for UnitBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Metrics for one rep within one unit bucket.
/// Rates are percentages on the 0-100 scale; capture may exceed 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    #[serde(default)]
    pub appointments: u32,
    #[serde(default)]
    pub close_rate: Option<f64>,
    #[serde(default)]
    pub capture_rate: Option<f64>,
}

impl CategoryStats {
    pub fn has_close_rate(&self) -> bool {
        self.close_rate.is_some()
    }

    /// At least `min_appointments` appointments and a positive close rate
    pub fn is_rankable(&self, min_appointments: u32) -> bool {
        self.appointments >= min_appointments && self.close_rate.is_some_and(|c| c > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRep {
    pub name: String,
    #[serde(default)]
    pub total_appts: u32,
    #[serde(default)]
    pub overall_close: Option<f64>,
    #[serde(default)]
    pub overall_capture: Option<f64>,
    #[serde(default)]
    pub categories: BTreeMap<UnitBucket, CategoryStats>,
}

impl SalesRep {
    /// New rep with no data in any bucket
    pub fn new(name: impl Into<String>) -> Self {
        let mut rep = Self {
            name: name.into(),
            total_appts: 0,
            overall_close: None,
            overall_capture: None,
            categories: BTreeMap::new(),
        };
        rep.fill_missing_buckets();
        rep
    }

    /// Ensure every bucket has an entry (absent data = zero appointments, no rates)
    pub fn fill_missing_buckets(&mut self) {
        for bucket in UnitBucket::ALL {
            self.categories.entry(bucket).or_default();
        }
    }

    pub fn category(&self, bucket: UnitBucket) -> CategoryStats {
        self.categories.get(&bucket).copied().unwrap_or_default()
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names() {
        assert_eq!(UnitBucket::Small.appointments_column(), "(0-4) Issued Appts");
        assert_eq!(UnitBucket::Mega.close_column(), "(26+) Overall Close %");
        assert_eq!(
            UnitBucket::ExtraLarge.capture_column(),
            "(18-25) Units Captured on Sold Jobs %"
        );
    }

    #[test]
    fn test_new_rep_has_all_buckets() {
        let rep = SalesRep::new("Jane Smith");
        assert_eq!(rep.categories.len(), 5);
        assert_eq!(rep.category(UnitBucket::Mega), CategoryStats::default());
        assert_eq!(rep.first_name(), "Jane");
    }

    #[test]
    fn test_is_rankable() {
        let stats = CategoryStats {
            appointments: 2,
            close_rate: Some(0.0),
            capture_rate: Some(119.78),
        };
        assert!(!stats.is_rankable(2)); // zero close rate
        let stats = CategoryStats {
            appointments: 2,
            close_rate: Some(50.0),
            capture_rate: None,
        };
        assert!(stats.is_rankable(2));
        assert!(!stats.is_rankable(3));
    }

    #[test]
    fn test_rep_json_uses_dashboard_keys() {
        let mut rep = SalesRep::new("Craig Chisman");
        rep.total_appts = 29;
        rep.overall_close = Some(44.83);
        let json = serde_json::to_value(&rep).unwrap();
        assert_eq!(json["totalAppts"], 29);
        assert_eq!(json["overallClose"], 44.83);
        assert!(json["categories"]["26+"].is_object());
        assert!(json["categories"]["0-4"]["closeRate"].is_null());
    }

    #[test]
    fn test_rep_json_missing_categories_default() {
        let json = r#"{"name": "Derek Kingry", "totalAppts": 39, "overallClose": 38.46}"#;
        let mut rep: SalesRep = serde_json::from_str(json).unwrap();
        assert!(rep.categories.is_empty());
        rep.fill_missing_buckets();
        assert_eq!(rep.categories.len(), 5);
        assert_eq!(rep.overall_capture, None);
    }
}
