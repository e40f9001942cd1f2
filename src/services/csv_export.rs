//! CSV encoding of report rows
//!
//! Cells are taken from each row's JSON serialization, column by column, so
//! a CSV export always carries exactly the values of the JSON report.

use serde_json::Value;

use crate::models::report::ReportRow;
use crate::utils::errors::{AppError, AppResult};

/// Header row plus one line per row, every data cell quoted.
///
/// No rows gives the header line alone.
pub fn to_csv<R: ReportRow>(rows: &[R]) -> AppResult<String> {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(R::COLUMNS.join(","));

    for row in rows {
        let value = serde_json::to_value(row)
            .map_err(|e| AppError::Internal(format!("Failed to serialize report row: {}", e)))?;
        let cells: Vec<String> = R::COLUMNS
            .iter()
            .map(|column| quote(&cell_text(value.get(*column).unwrap_or(&Value::Null))))
            .collect();
        lines.push(cells.join(","));
    }

    Ok(lines.join("\n"))
}

/// Plain text of a JSON value as it appears in a CSV cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
