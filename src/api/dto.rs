use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::SensorReadingRow;

/// One latest-reading row as served by `GET /api/data`. Field names match
/// the `sensors_data` column names exactly.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SensorReadingDto {
    pub id: i64,
    pub sensor_id: String,
    pub brand: String,
    pub model: String,
    pub channel: String,
    /// 1 when the sensor reported a healthy battery, else 0.
    pub battery_ok: i8,
    /// Degrees Celsius
    pub temperature_c: Option<f64>,
    /// Relative humidity percentage
    pub humidity: Option<f64>,
    /// The full decoded event as originally received.
    pub raw_json: String,
    pub timestamp: DateTime<Utc>,
}

impl From<SensorReadingRow> for SensorReadingDto {
    fn from(r: SensorReadingRow) -> Self {
        Self {
            id: r.id,
            sensor_id: r.sensor_id,
            brand: r.brand,
            model: r.model,
            channel: r.channel,
            battery_ok: r.battery_ok,
            temperature_c: r.temperature_c,
            humidity: r.humidity,
            raw_json: r.raw_json,
            timestamp: r.timestamp,
        }
    }
}

/// Request body for `POST /api/aliases`. An absent or empty `alias` removes
/// the stored entry instead of updating it.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AliasUpsertRequest {
    pub sensor_id: String,
    pub alias: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dto_serializes_with_column_names() {
        let dto = SensorReadingDto {
            id: 7,
            sensor_id: "a1b2".into(),
            brand: "Generic".into(),
            model: "Unknown".into(),
            channel: "0".into(),
            battery_ok: 1,
            temperature_c: Some(21.5),
            humidity: None,
            raw_json: "{}".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };

        let value = serde_json::to_value(&dto).unwrap();
        let object = value.as_object().unwrap();
        for column in [
            "id",
            "sensor_id",
            "brand",
            "model",
            "channel",
            "battery_ok",
            "temperature_c",
            "humidity",
            "raw_json",
            "timestamp",
        ] {
            assert!(object.contains_key(column), "missing column field {column}");
        }
        assert_eq!(object.len(), 10);
        assert_eq!(value["battery_ok"], 1);
        assert_eq!(value["humidity"], serde_json::Value::Null);
    }
}
