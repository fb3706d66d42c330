//! Stored record format
//!
//! One ingested payload per file: `data_<YYYYMMDD_HHMMSS_ffffff>.json`
//! holding `{"received_at": ..., "data": ...}`.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const FILE_PREFIX: &str = "data_";
const FILE_SUFFIX: &str = ".json";

/// On-disk record wrapping a payload with its receipt time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// ISO-8601 local timestamp with microseconds
    pub received_at: String,
    /// The payload exactly as parsed from the request body
    pub data: Value,
}

impl StoredRecord {
    pub fn new(received_at: &DateTime<Local>, data: Value) -> Self {
        Self {
            received_at: received_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            data,
        }
    }

    /// Pretty-printed JSON with 2-space indentation
    pub fn to_pretty_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

/// Timestamp part of a record file name, microsecond resolution
pub fn file_stamp(at: &DateTime<Local>) -> String {
    at.format("%Y%m%d_%H%M%S_%6f").to_string()
}

/// File name for a record; `attempt > 0` adds a `-<attempt>` suffix
pub fn record_file_name(at: &DateTime<Local>, attempt: u32) -> String {
    let stamp = file_stamp(at);
    if attempt == 0 {
        format!("{FILE_PREFIX}{stamp}{FILE_SUFFIX}")
    } else {
        format!("{FILE_PREFIX}{stamp}-{attempt}{FILE_SUFFIX}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, TimeZone};
    use serde_json::json;

    fn fixed_time() -> DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_micro_opt(7, 5, 4, 1234)
            .unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap()
    }

    #[test]
    fn test_file_name() {
        let at = fixed_time();
        assert_eq!(record_file_name(&at, 0), "data_20240309_070504_001234.json");
        assert_eq!(record_file_name(&at, 2), "data_20240309_070504_001234-2.json");
    }

    #[test]
    fn test_received_at_format() {
        let record = StoredRecord::new(&fixed_time(), json!({"a": 1}));
        assert_eq!(record.received_at, "2024-03-09T07:05:04.001234");
        assert!(NaiveDateTime::parse_from_str(&record.received_at, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    }

    #[test]
    fn test_pretty_json_layout() {
        let record = StoredRecord::new(&fixed_time(), json!({"visitor": "x"}));
        let text = String::from_utf8(record.to_pretty_json().unwrap()).unwrap();
        let expected = "{\n  \"received_at\": \"2024-03-09T07:05:04.001234\",\n  \"data\": {\n    \"visitor\": \"x\"\n  }\n}";
        assert_eq!(text, expected);
    }
}
