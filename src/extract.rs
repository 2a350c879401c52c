//! Table extraction.
//!
//! This is the only place that looks at document structure. It tolerates
//! malformed markup row by row and hands typed `RawTable`s downstream.
use crate::error::{PresaleError, Result};
use crate::model::{RawRow, RawTable};
use scraper::{ElementRef, Html, Selector};

pub const UNKNOWN_YEAR: &str = "unknown";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| PresaleError::Config(format!("invalid selector {css}: {e}")))
}

fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Returns every table whose `summary` attribute contains `marker`, in
/// document order. Fails with `NoMatchingTable` if there are none.
pub fn extract_tables(markup: &str, marker: &str) -> Result<Vec<RawTable>> {
    let document = Html::parse_document(markup);
    let table_sel = selector("table")?;
    let caption_sel = selector("caption")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;

    let tables: Vec<RawTable> = document
        .select(&table_sel)
        .filter(|t| t.value().attr("summary").is_some_and(|s| s.contains(marker)))
        .map(|table| {
            let year_label = table
                .select(&caption_sel)
                .next()
                .map(cell_text)
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| UNKNOWN_YEAR.to_string());

            let mut rows: Vec<RawRow> = Vec::new();
            let mut malformed_rows = 0;
            // First row is the header.
            for row in table.select(&row_sel).skip(1) {
                let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
                match <[String; 3]>::try_from(cells) {
                    Ok([name, period, date]) => rows.push((name, period, date)),
                    Err(_) => malformed_rows += 1,
                }
            }

            RawTable {
                year_label,
                rows,
                malformed_rows,
            }
        })
        .collect();

    if tables.is_empty() {
        return Err(PresaleError::NoMatchingTable {
            marker: marker.to_string(),
        });
    }
    Ok(tables)
}
