//! Interpreting individual spreadsheet cells as counts and percentages.

use crate::ingest::Cell;

/// Text markers that mean "no value" in exported spreadsheets
const MISSING_MARKERS: &[&str] = &["-", "—", "n/a", "na", "nan"];

/// Plain close rates at or below this bound mark the column as fractions
pub const CLOSE_FRACTION_LIMIT: f64 = 1.0;
/// Capture can pass 100%, so a fraction capture column may hold values up to 5.0
pub const CAPTURE_FRACTION_LIMIT: f64 = 5.0;
/// A rep cannot close more jobs than they were issued
pub const MAX_CLOSE_RATE: f64 = 100.0;

/// A numeric cell value and whether it was written with a `%` sign
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedNumber {
    pub value: f64,
    pub percent_sign: bool,
}

/// How plain numbers in a percentage column are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentScale {
    /// 42.5 means 42.5%
    Percent,
    /// 0.425 means 42.5%
    Fraction,
}

/// Which rate a percentage column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateKind {
    Close,
    Capture,
}

impl RateKind {
    /// Largest plain value that still reads as a fraction
    pub fn fraction_limit(self) -> f64 {
        match self {
            RateKind::Close => CLOSE_FRACTION_LIMIT,
            RateKind::Capture => CAPTURE_FRACTION_LIMIT,
        }
    }
}

fn is_missing_marker(s: &str) -> bool {
    let lower = s.trim().to_lowercase();
    lower.is_empty() || MISSING_MARKERS.contains(&lower.as_str())
}

/// Parse a numeric cell. `Ok(None)` means the cell holds no value; `Err`
/// carries a user-facing reason.
pub fn parse_number(cell: &Cell) -> Result<Option<ParsedNumber>, String> {
    let parsed = match cell {
        Cell::Empty => return Ok(None),
        Cell::Number(n) if n.is_nan() => return Ok(None),
        Cell::Number(n) => ParsedNumber {
            value: *n,
            percent_sign: false,
        },
        Cell::Text(s) => {
            if is_missing_marker(s) {
                return Ok(None);
            }
            let percent_sign = s.contains('%');
            let cleaned = s.replace(['%', ','], "");
            let cleaned = cleaned.trim();
            if is_missing_marker(cleaned) {
                return Ok(None);
            }
            let value: f64 = cleaned
                .parse()
                .map_err(|_| format!("'{}' is not a number", s))?;
            if value.is_nan() {
                return Ok(None);
            }
            ParsedNumber {
                value,
                percent_sign,
            }
        }
    };

    if !parsed.value.is_finite() {
        return Err(format!("'{}' is not a finite number", cell.as_text()));
    }
    if parsed.value < 0.0 {
        return Err(format!("'{}' is negative", cell.as_text()));
    }
    Ok(Some(parsed))
}

/// Parse an appointment count. Missing counts are zero; Excel floats such as
/// `9.0` are accepted, `12.5` is not.
pub fn parse_count(cell: &Cell) -> Result<u32, String> {
    let Some(parsed) = parse_number(cell)? else {
        return Ok(0);
    };
    if parsed.value.fract() != 0.0 {
        return Err(format!("'{}' is not a whole number", cell.as_text()));
    }
    if parsed.value > u32::MAX as f64 {
        return Err(format!("'{}' is too large", cell.as_text()));
    }
    Ok(parsed.value as u32)
}

/// Parse a percentage onto the 0-100 scale
pub fn parse_percentage(cell: &Cell, scale: PercentScale) -> Result<Option<f64>, String> {
    Ok(parse_number(cell)?.map(|p| {
        if !p.percent_sign && scale == PercentScale::Fraction {
            p.value * 100.0
        } else {
            p.value
        }
    }))
}

/// Parse a close rate, rejecting values above 100%
pub fn parse_close_rate(cell: &Cell, scale: PercentScale) -> Result<Option<f64>, String> {
    match parse_percentage(cell, scale)? {
        Some(v) if v > MAX_CLOSE_RATE => Err(format!("'{}' is above 100%", cell.as_text())),
        rate => Ok(rate),
    }
}

/// Decide how a percentage column is written from all of its cells
pub fn detect_scale<'a>(
    cells: impl IntoIterator<Item = &'a Cell>,
    kind: RateKind,
) -> PercentScale {
    let limit = kind.fraction_limit();
    let mut plain_seen = false;
    for cell in cells {
        if let Ok(Some(p)) = parse_number(cell) {
            if p.percent_sign {
                continue;
            }
            if p.value > limit {
                return PercentScale::Percent;
            }
            plain_seen = true;
        }
    }
    if plain_seen {
        PercentScale::Fraction
    } else {
        PercentScale::Percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_missing_markers() {
        for cell in [
            Cell::Empty,
            Cell::Number(f64::NAN),
            text("-"),
            text("—"),
            text("N/A"),
            text("nan"),
            text(" % "),
        ] {
            assert_eq!(parse_number(&cell), Ok(None), "{:?}", cell);
        }
    }

    #[test]
    fn test_parse_number_strips_symbols() {
        let parsed = parse_number(&text("1,250.5%")).unwrap().unwrap();
        assert_eq!(parsed.value, 1250.5);
        assert!(parsed.percent_sign);
    }

    #[test]
    fn test_parse_number_rejects() {
        assert_eq!(
            parse_number(&text("abc")),
            Err("'abc' is not a number".to_string())
        );
        assert_eq!(
            parse_number(&Cell::Number(-3.0)),
            Err("'-3' is negative".to_string())
        );
        assert!(parse_number(&Cell::Number(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(&Cell::Number(9.0)), Ok(9));
        assert_eq!(parse_count(&text("12")), Ok(12));
        assert_eq!(parse_count(&Cell::Empty), Ok(0));
        assert_eq!(
            parse_count(&text("12.5")),
            Err("'12.5' is not a whole number".to_string())
        );
    }

    #[test]
    fn test_parse_percentage_scales() {
        assert_eq!(
            parse_percentage(&Cell::Number(0.42), PercentScale::Fraction),
            Ok(Some(42.0))
        );
        assert_eq!(
            parse_percentage(&Cell::Number(42.0), PercentScale::Percent),
            Ok(Some(42.0))
        );
        // An explicit % sign is never rescaled
        assert_eq!(
            parse_percentage(&text("0.5%"), PercentScale::Fraction),
            Ok(Some(0.5))
        );
        assert_eq!(parse_percentage(&text("-"), PercentScale::Fraction), Ok(None));
    }

    #[test]
    fn test_detect_scale() {
        let fractions = [Cell::Number(0.35), Cell::Number(1.12), Cell::Empty];
        assert_eq!(
            detect_scale(&fractions, RateKind::Capture),
            PercentScale::Fraction
        );

        let percents = [Cell::Number(0.5), Cell::Number(42.0)];
        assert_eq!(
            detect_scale(&percents, RateKind::Capture),
            PercentScale::Percent
        );

        // values with a % sign do not vote
        let mixed = [text("45%"), Cell::Number(0.3)];
        assert_eq!(detect_scale(&mixed, RateKind::Close), PercentScale::Fraction);

        let none = [Cell::Empty, text("12%")];
        assert_eq!(detect_scale(&none, RateKind::Close), PercentScale::Percent);
    }

    #[test]
    fn test_detect_scale_small_close_percentages() {
        // 3.33% and 0% written without a sign are percentages, not 333%
        let close = [Cell::Number(3.33), Cell::Number(0.0)];
        assert_eq!(detect_scale(&close, RateKind::Close), PercentScale::Percent);
        assert_eq!(
            detect_scale(&close, RateKind::Capture),
            PercentScale::Fraction
        );

        let fractions = [Cell::Number(0.38), Cell::Number(1.0)];
        assert_eq!(
            detect_scale(&fractions, RateKind::Close),
            PercentScale::Fraction
        );
    }

    #[test]
    fn test_parse_close_rate_bounds() {
        assert_eq!(
            parse_close_rate(&Cell::Number(1.0), PercentScale::Fraction),
            Ok(Some(100.0))
        );
        assert_eq!(
            parse_close_rate(&text("150"), PercentScale::Percent),
            Err("'150' is above 100%".to_string())
        );
        assert_eq!(parse_close_rate(&Cell::Empty, PercentScale::Percent), Ok(None));
    }
}
