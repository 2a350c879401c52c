// Raw row -> PresaleRecord.
use crate::error::{PresaleError, Result};
use crate::model::{PresaleRecord, RawRow, parse_sale_date};

/// Converts one three-cell row. A bad date or a blank holiday name fails
/// this row only.
pub fn normalize_row(row: &RawRow, year_label: &str) -> Result<PresaleRecord> {
    let (holiday_name, travel_period, sale_date_text) = row;
    let holiday_name = holiday_name.trim();
    if holiday_name.is_empty() {
        return Err(PresaleError::InvalidRow(format!(
            "no holiday name (sale date '{}')",
            sale_date_text.trim()
        )));
    }
    let sale_date = parse_sale_date(sale_date_text)?;
    Ok(PresaleRecord {
        holiday_name: holiday_name.to_string(),
        travel_period: travel_period.trim().to_string(),
        sale_date,
        source_year_label: year_label.to_string(),
    })
}
