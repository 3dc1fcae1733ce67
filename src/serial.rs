use std::fmt;

use log::{debug, warn};
use serde_json::Value;

use crate::sheets::{is_truthy, SheetStore};

/// Display identifier attached to each response, `SN-001`, `SN-002`, ...
///
/// Purely cosmetic: nothing enforces uniqueness, and concurrent submissions
/// or repeated lookup failures can hand out the same number twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerialNumber(String);

impl SerialNumber {
    pub fn from_index(index: usize) -> Self {
        Self(format!("SN-{:03}", index))
    }

    pub fn first() -> Self {
        Self::from_index(1)
    }

    /// Next serial after the rows already in the sheet. A leading header row
    /// (first cell mentions "timestamp") is not counted.
    pub fn next_from_rows(rows: &[Vec<Value>]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        let has_header = rows[0].first().map(is_header_cell).unwrap_or(false);
        let data_rows = if has_header { rows.len() - 1 } else { rows.len() };
        Some(Self::from_index(data_rows + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for SerialNumber {
    fn default() -> Self {
        Self::first()
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_header_cell(cell: &Value) -> bool {
    let text = match cell {
        _ if !is_truthy(cell) => return false,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.to_lowercase().contains("timestamp")
}

/// Works out the serial for the next response from the current sheet
/// contents. Never fails: any problem reading the sheet falls back to
/// `SN-001` and is only logged.
pub async fn resolve_next_serial<S: SheetStore + ?Sized>(store: &S, sheet_name: &str) -> SerialNumber {
    match store.read_sheet(sheet_name).await {
        Ok(response) if response.success => {
            let rows = response.values.unwrap_or_default();
            match SerialNumber::next_from_rows(&rows) {
                Some(serial) => {
                    debug!("Resolved serial {} from {} row(s)", serial, rows.len());
                    serial
                }
                None => {
                    debug!("Sheet '{}' has no rows, starting at {}", sheet_name, SerialNumber::first());
                    SerialNumber::first()
                }
            }
        }
        Ok(_) => {
            warn!("Sheet read for '{}' reported failure, using default serial number", sheet_name);
            SerialNumber::first()
        }
        Err(e) => {
            warn!("Could not fetch existing data, using default serial number: {}", e);
            SerialNumber::first()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Vec<Value>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_header_plus_one_row() {
        let rows = rows(json!([
            ["Timestamp", "SN", "Name", "Mobile", "City", "Company"],
            ["03/01/2024 09:05:07", "SN-001", "Asha", "9876543210", "Raipur", ""]
        ]));
        assert_eq!(SerialNumber::next_from_rows(&rows), Some(SerialNumber::from_index(2)));
    }

    #[test]
    fn test_header_only() {
        let rows = rows(json!([["Timestamp", "SN", "Name"]]));
        assert_eq!(SerialNumber::next_from_rows(&rows).unwrap().as_str(), "SN-001");
    }

    #[test]
    fn test_header_detection_is_case_insensitive_substring() {
        let rows = rows(json!([["Submission TIMESTAMP (IST)"], ["x"], ["y"]]));
        assert_eq!(SerialNumber::next_from_rows(&rows).unwrap().as_str(), "SN-003");
    }

    #[test]
    fn test_rows_without_header_all_count() {
        let rows = rows(json!([["03/01/2024 09:05:07", "SN-001"], ["04/01/2024 10:00:00", "SN-002"]]));
        assert_eq!(SerialNumber::next_from_rows(&rows).unwrap().as_str(), "SN-003");

        // Non-string or falsy first cells are never a header.
        let rows = rows_of_first_cells(vec![json!(0), json!(null), json!(false), json!("")]);
        assert_eq!(SerialNumber::next_from_rows(&rows).unwrap().as_str(), "SN-005");
        let rows = rows_of_first_cells(vec![json!(12)]);
        assert_eq!(SerialNumber::next_from_rows(&rows).unwrap().as_str(), "SN-002");

        let empty_first_row = vec![vec![], vec![json!("x")]];
        assert_eq!(SerialNumber::next_from_rows(&empty_first_row).unwrap().as_str(), "SN-003");
    }

    fn rows_of_first_cells(cells: Vec<Value>) -> Vec<Vec<Value>> {
        cells.into_iter().map(|c| vec![c]).collect()
    }

    #[test]
    fn test_empty_sheet_has_no_next() {
        assert_eq!(SerialNumber::next_from_rows(&[]), None);
    }

    #[test]
    fn test_padding_grows_past_three_digits() {
        assert_eq!(SerialNumber::from_index(7).as_str(), "SN-007");
        assert_eq!(SerialNumber::from_index(42).as_str(), "SN-042");
        assert_eq!(SerialNumber::from_index(1000).as_str(), "SN-1000");
        assert_eq!(SerialNumber::default().to_string(), "SN-001");
    }
}
