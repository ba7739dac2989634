use snafu::ResultExt;
use std::path::Path;

use super::error::*;
use crate::model::SalesRep;

/// Read a JSON snapshot as written by `convert`. Buckets missing from the
/// file are filled with empty stats.
pub fn read_json_file(path: &Path) -> IngestResult<Vec<SalesRep>> {
    let path_str = path.display().to_string();
    let content = std::fs::read_to_string(path).context(OpeningFileSnafu {
        path: path_str.clone(),
    })?;
    parse_reps(&content, &path_str)
}

pub fn parse_reps(content: &str, origin: &str) -> IngestResult<Vec<SalesRep>> {
    let mut reps: Vec<SalesRep> =
        serde_json::from_str(content).context(ParsingJsonSnafu { path: origin })?;
    reps.retain(|r| !r.name.trim().is_empty());
    for rep in &mut reps {
        rep.fill_missing_buckets();
    }
    if reps.is_empty() {
        return NoValidDataSnafu { rejected: 0usize }.fail();
    }
    Ok(reps)
}

/// Serialize reps as the camelCase JSON snapshot `read_json_file` accepts
pub fn reps_to_json(reps: &[SalesRep]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnitBucket;

    #[test]
    fn test_parse_reps() {
        let json = r#"[
            {"name": "Derek Kingry", "totalAppts": 39, "overallClose": 38.46,
             "categories": {"0-4": {"appointments": 15, "closeRate": 40.0, "captureRate": 133.59}}},
            {"name": "  ", "totalAppts": 1}
        ]"#;
        let reps = parse_reps(json, "inline").unwrap();
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].categories.len(), 5);
        assert_eq!(reps[0].category(UnitBucket::Small).appointments, 15);
        assert_eq!(reps[0].category(UnitBucket::Mega).close_rate, None);
    }

    #[test]
    fn test_snapshot_parses_back() {
        let reps = crate::sample::sample_reps();
        let json = reps_to_json(&reps).unwrap();
        assert!(json.contains("\"totalAppts\": 32"));
        assert_eq!(parse_reps(&json, "snapshot").unwrap(), reps);
    }

    #[test]
    fn test_parse_reps_invalid() {
        assert!(matches!(
            parse_reps("{not json", "inline"),
            Err(IngestError::ParsingJson { .. })
        ));
        assert!(matches!(
            parse_reps("[]", "inline"),
            Err(IngestError::NoValidData { rejected: 0 })
        ));
    }
}
