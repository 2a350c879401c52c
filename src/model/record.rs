// Typed records produced from the schedule tables.
use crate::error::{PresaleError, Result};
use chrono::NaiveDate;

/// One table row as `(holiday name, travel period, sale date)` cell text.
pub type RawRow = (String, String, String);

/// A schedule table as lifted out of the markup, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub year_label: String,
    pub rows: Vec<RawRow>,
    /// Body rows dropped because they did not have exactly three cells.
    pub malformed_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresaleRecord {
    pub holiday_name: String,
    pub travel_period: String,
    pub sale_date: NaiveDate,
    pub source_year_label: String,
}

/// Parses the sale-date cell. Only the part before the first space counts,
/// so `2025/04/10 10:00` and `2025/04/10` yield the same date.
pub fn parse_sale_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    let date_part = trimmed.split(' ').next().unwrap_or_default();
    NaiveDate::parse_from_str(date_part, "%Y/%m/%d").map_err(|_| PresaleError::DateParse {
        input: trimmed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_date_with_time_suffix() {
        assert_eq!(
            parse_sale_date("2025/04/10 10:00").unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
        );
    }

    #[test]
    fn parses_bare_date_and_trims() {
        assert_eq!(
            parse_sale_date("  2024/12/31\n").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
    }

    #[test]
    fn rejects_other_formats() {
        for input in ["2025-04-10", "04/10/2025", "2025/13/01", "2025/02/30", "", "待公告"] {
            assert!(
                matches!(parse_sale_date(input), Err(PresaleError::DateParse { .. })),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn date_parse_error_is_not_fatal() {
        let err = parse_sale_date("soon").unwrap_err();
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("soon"));
    }
}
