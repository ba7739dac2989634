//! Built-in sample data shown when no data source is given, and the sample
//! spreadsheet written by the `sample` command.

use anyhow::{Context, Result};
use std::path::Path;

use crate::model::{CategoryStats, SalesRep, UnitBucket};

fn stats(appointments: u32, close_rate: Option<f64>, capture_rate: Option<f64>) -> CategoryStats {
    CategoryStats {
        appointments,
        close_rate,
        capture_rate,
    }
}

fn rep(
    name: &str,
    total_appts: u32,
    overall_close: f64,
    overall_capture: f64,
    categories: [CategoryStats; 5],
) -> SalesRep {
    let mut rep = SalesRep::new(name);
    rep.total_appts = total_appts;
    rep.overall_close = Some(overall_close);
    rep.overall_capture = Some(overall_capture);
    for (bucket, cat) in UnitBucket::ALL.into_iter().zip(categories) {
        rep.categories.insert(bucket, cat);
    }
    rep
}

/// Three reps with data in every bucket shape the dashboard has to handle:
/// a zero close rate, an empty bucket, and a single-appointment bucket.
pub fn sample_reps() -> Vec<SalesRep> {
    vec![
        rep(
            "Gabriel Grimm",
            32,
            31.25,
            94.20,
            [
                stats(9, Some(22.22), Some(222.54)),
                stats(2, Some(0.0), Some(119.78)),
                stats(10, Some(30.0), Some(97.43)),
                stats(6, Some(66.67), Some(102.35)),
                stats(5, Some(20.0), Some(52.78)),
            ],
        ),
        rep(
            "Derek Kingry",
            39,
            38.46,
            107.17,
            [
                stats(15, Some(40.0), Some(133.59)),
                stats(9, Some(44.44), Some(122.89)),
                stats(8, Some(12.5), Some(100.67)),
                stats(7, Some(57.14), Some(66.67)),
                stats(0, None, None),
            ],
        ),
        rep(
            "Craig Chisman",
            29,
            44.83,
            98.0,
            [
                stats(14, Some(50.0), Some(149.0)),
                stats(7, Some(42.86), Some(120.0)),
                stats(5, Some(40.0), Some(71.0)),
                stats(2, Some(50.0), Some(60.0)),
                stats(1, Some(0.0), None),
            ],
        ),
    ]
}

/// Write a sample CSV in the standard export layout, including the extra
/// columns real weekly exports carry (revenue per appointment, mix, ...).
pub fn write_sample_csv(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create sample file at {}", path.display()))?;

    let mut header: Vec<String> = [
        "Sales Rep",
        "Issued Appts",
        "RpA",
        "RpU",
        "Overall Close %",
        "Avg Sale Price",
        "Units Captured on Sold Jobs %",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for bucket in UnitBucket::ALL {
        header.push(bucket.appointments_column());
        header.push(format!("({}) Mix %", bucket.label()));
        header.push(bucket.close_column());
        header.push(bucket.capture_column());
    }
    writer.write_record(&header)?;

    let base = [
        ("John Doe", 25, 15000, 1500, 0.35, 1.05),
        ("Jane Smith", 30, 18000, 1800, 0.42, 0.98),
        ("Bob Johnson", 20, 12000, 1200, 0.28, 1.12),
    ];
    // Per-bucket columns: appointments, mix, close, capture
    let buckets = [
        (8, 0.32, 0.38, 1.2),
        (6, 0.20, 0.50, 0.9),
        (4, 0.16, 0.25, 1.1),
        (4, 0.16, 0.25, 0.8),
        (3, 0.12, 0.33, 1.0),
    ];

    for (name, appts, rpa, rpu, close, capture) in base {
        let mut record = vec![
            name.to_string(),
            appts.to_string(),
            rpa.to_string(),
            rpu.to_string(),
            close.to_string(),
            "42857".to_string(),
            capture.to_string(),
        ];
        for (b_appts, mix, b_close, b_capture) in buckets {
            record.push(b_appts.to_string());
            record.push(mix.to_string());
            record.push(b_close.to_string());
            record.push(b_capture.to_string());
        }
        writer.write_record(&record)?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write sample file at {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::csv_reader::read_csv_file;
    use crate::normalize::{normalize_table, Layout};
    use std::env;

    #[test]
    fn test_sample_reps_complete() {
        let reps = sample_reps();
        assert_eq!(reps.len(), 3);
        for rep in &reps {
            assert_eq!(rep.categories.len(), 5);
        }
        assert_eq!(reps[1].category(UnitBucket::Mega).close_rate, None);
    }

    #[test]
    fn test_sample_csv_normalizes() {
        let path = env::temp_dir().join("sales_rank_test_sample.csv");
        let _ = std::fs::remove_file(&path);

        write_sample_csv(&path).unwrap();
        let table = read_csv_file(&path).unwrap();
        let outcome = normalize_table(&table).unwrap();

        assert_eq!(outcome.layout, Layout::Standard);
        assert_eq!(outcome.reps.len(), 3);
        assert!(outcome.rejections.is_empty());

        let jane = &outcome.reps[1];
        assert_eq!(jane.name, "Jane Smith");
        assert_eq!(jane.total_appts, 30);
        assert!((jane.overall_close.unwrap() - 42.0).abs() < 1e-9);
        // 0.98 is a fraction -> 98%
        assert!((jane.overall_capture.unwrap() - 98.0).abs() < 1e-9);
        // the whole capture column is written as fractions, so 1.2 -> 120%
        let small = jane.category(UnitBucket::Small);
        assert_eq!(small.appointments, 8);
        assert!((small.capture_rate.unwrap() - 120.0).abs() < 1e-9);

        let _ = std::fs::remove_file(&path);
    }
}
