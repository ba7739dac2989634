//! Mapping spreadsheet headers onto the fields the dashboard needs.

use std::collections::BTreeMap;

use crate::model::UnitBucket;

pub const REP_COLUMN: &str = "Sales Rep";
pub const APPOINTMENTS_COLUMN: &str = "Issued Appts";
pub const CLOSE_COLUMN: &str = "Overall Close %";
pub const CAPTURE_COLUMN: &str = "Units Captured on Sold Jobs %";

/// Header layout of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// The dashboard's own export format, matched by exact header names
    Standard,
    /// Anything else, matched heuristically
    Custom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketColumns {
    pub appointments: Option<usize>,
    pub close: Option<usize>,
    pub capture: Option<usize>,
}

impl BucketColumns {
    pub fn is_complete(&self) -> bool {
        self.appointments.is_some() && self.close.is_some() && self.capture.is_some()
    }
}

/// Column index for every field, `None` when the input lacks it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    pub rep: Option<usize>,
    pub appointments: Option<usize>,
    pub overall_close: Option<usize>,
    pub overall_capture: Option<usize>,
    pub buckets: BTreeMap<UnitBucket, BucketColumns>,
}

impl ColumnMap {
    /// Names of required columns that could not be found
    pub fn missing_required(&self) -> Vec<String> {
        [
            (self.rep, REP_COLUMN),
            (self.appointments, APPOINTMENTS_COLUMN),
            (self.overall_close, CLOSE_COLUMN),
            (self.overall_capture, CAPTURE_COLUMN),
        ]
        .into_iter()
        .filter(|(idx, _)| idx.is_none())
        .map(|(_, name)| name.to_string())
        .collect()
    }

    pub fn bucket(&self, bucket: UnitBucket) -> BucketColumns {
        self.buckets.get(&bucket).copied().unwrap_or_default()
    }
}

fn fold(header: &str) -> String {
    header.trim().to_lowercase()
}

fn find_exact(headers: &[String], name: &str) -> Option<usize> {
    let target = fold(name);
    headers.iter().position(|h| fold(h) == target)
}

/// Detect the layout and resolve every column
pub fn resolve_columns(headers: &[String]) -> (ColumnMap, Layout) {
    let is_standard = UnitBucket::ALL
        .iter()
        .any(|b| find_exact(headers, &b.appointments_column()).is_some());
    if is_standard {
        (resolve_standard(headers), Layout::Standard)
    } else {
        (resolve_custom(headers), Layout::Custom)
    }
}

fn resolve_standard(headers: &[String]) -> ColumnMap {
    let buckets = UnitBucket::ALL
        .into_iter()
        .map(|b| {
            let cols = BucketColumns {
                appointments: find_exact(headers, &b.appointments_column()),
                close: find_exact(headers, &b.close_column()),
                capture: find_exact(headers, &b.capture_column()),
            };
            (b, cols)
        })
        .collect();
    ColumnMap {
        rep: find_exact(headers, REP_COLUMN),
        appointments: find_exact(headers, APPOINTMENTS_COLUMN),
        overall_close: find_exact(headers, CLOSE_COLUMN),
        overall_capture: find_exact(headers, CAPTURE_COLUMN),
        buckets,
    }
}

/// Bucket and metric a custom header refers to, if any
fn bucket_metric(header: &str) -> Option<(UnitBucket, Metric)> {
    let squashed: String = fold(header)
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();
    // longest labels first so "1017" wins over shorter overlaps
    let mut buckets = UnitBucket::ALL;
    buckets.sort_by_key(|b| std::cmp::Reverse(b.label().len()));
    let bucket = buckets
        .into_iter()
        .find(|b| squashed.contains(&b.label().replace('-', "")))?;
    let metric = if squashed.contains("appt") {
        Metric::Appointments
    } else if squashed.contains("close") {
        Metric::Close
    } else if squashed.contains("capture") {
        Metric::Capture
    } else {
        return None;
    };
    Some((bucket, metric))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    Appointments,
    Close,
    Capture,
}

fn resolve_custom(headers: &[String]) -> ColumnMap {
    let mut map = ColumnMap::default();
    let mut claimed = vec![false; headers.len()];

    for (idx, header) in headers.iter().enumerate() {
        let Some((bucket, metric)) = bucket_metric(header) else {
            continue;
        };
        let cols = map.buckets.entry(bucket).or_default();
        let slot = match metric {
            Metric::Appointments => &mut cols.appointments,
            Metric::Close => &mut cols.close,
            Metric::Capture => &mut cols.capture,
        };
        if slot.is_none() {
            *slot = Some(idx);
            claimed[idx] = true;
        }
    }

    for (idx, header) in headers.iter().enumerate() {
        if claimed[idx] {
            continue;
        }
        let h = fold(header);
        let slot = if h.contains("sales rep") || h.contains("rep name") || h.contains("name") {
            &mut map.rep
        } else if h.contains("total appt") || h.contains("issued appt") || h.contains("appointments")
        {
            &mut map.appointments
        } else if h.contains("overall close") || h.contains("close rate") || h.contains("close %")
        {
            &mut map.overall_close
        } else if h.contains("units captured")
            || (h.contains("capture") && (h.contains("overall") || h.contains("total")))
        {
            &mut map.overall_capture
        } else {
            continue;
        };
        if slot.is_none() {
            *slot = Some(idx);
        }
    }

    for bucket in UnitBucket::ALL {
        map.buckets.entry(bucket).or_default();
    }
    map
}
