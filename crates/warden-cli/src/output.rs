// crates/warden-cli/src/output.rs
//
// Output formatting utilities for the warden CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

use warden_core::events::LedgerEvent;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// One `name | value` line of a detail view.
#[derive(Debug, Tabled)]
pub struct KeyValueRow {
    #[tabled(rename = "Field")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl KeyValueRow {
    pub fn new(key: &str, value: impl ToString) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Tabled)]
struct EventRow {
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Details")]
    details: String,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Print `value` as JSON, or `rows` as a table.
pub fn print_view<T: Serialize>(format: OutputFormat, value: &T, rows: &[KeyValueRow]) {
    match format {
        OutputFormat::Json => println!("{}", format_json(value)),
        OutputFormat::Table => println!("{}", format_table(rows)),
    }
}

/// Print the events committed by a command.
pub fn print_events(format: OutputFormat, events: &[LedgerEvent]) {
    match format {
        OutputFormat::Json => println!("{}", format_json(&events)),
        OutputFormat::Table => {
            if events.is_empty() {
                println!("No state change.");
                return;
            }
            let rows: Vec<EventRow> = events.iter().map(event_row).collect();
            println!("{}", format_table(&rows));
        }
    }
}

fn event_row(event: &LedgerEvent) -> EventRow {
    let mut value = serde_json::to_value(event).unwrap_or(serde_json::Value::Null);
    let name = value
        .as_object_mut()
        .and_then(|obj| obj.remove("event"))
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string());
    let details = match value.as_object() {
        Some(obj) => obj
            .iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => format!("{}={}", k, s),
                other => format!("{}={}", k, other),
            })
            .collect::<Vec<_>>()
            .join(" "),
        None => String::new(),
    };
    EventRow { event: name, details }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::types::Address;

    #[test]
    fn test_event_row_splits_tag() {
        let row = event_row(&LedgerEvent::VaultRegistered {
            vault: Address([0x11; 20]),
        });
        assert_eq!(row.event, "vault_registered");
        assert_eq!(row.details, format!("vault={}", Address([0x11; 20])));
    }

    #[test]
    fn test_event_row_numbers_unquoted() {
        let row = event_row(&LedgerEvent::ThresholdUpdated {
            old_threshold: 7_000,
            new_threshold: 8_000,
        });
        assert_eq!(row.event, "threshold_updated");
        assert!(row.details.contains("old_threshold=7000"));
        assert!(row.details.contains("new_threshold=8000"));
    }
}
