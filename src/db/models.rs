use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of `sensors_data`. `raw_json` holds the full original event, so
/// parsing it back always yields a superset of the typed columns.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SensorReadingRow {
    pub id: i64,
    pub sensor_id: String,
    pub brand: String,
    pub model: String,
    pub channel: String,
    /// 0 or 1 — see the ingest adapter for the normalization rule.
    pub battery_ok: i8,
    pub temperature_c: Option<f64>,
    pub humidity: Option<f64>,
    pub raw_json: String,
    /// Assigned by the store at insert time, never by the writer.
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SensorAlias {
    pub sensor_id: String,
    pub alias: String,
}
