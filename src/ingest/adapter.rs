use serde_json::{Map, Value};

/// Fixed insert statement executed by the persistence layer. The `timestamp`
/// column is deliberately absent — the store assigns it at insert time.
pub const INSERT_STATEMENT: &str = "INSERT INTO sensors_data \
    (sensor_id, brand, model, channel, battery_ok, temperature_c, humidity, raw_json) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

/// Defaulting policy for text fields, in one place so it can be reviewed as
/// a table: field name in the event → value used when the field is missing.
const TEXT_DEFAULTS: &[(&str, &str)] = &[
    ("id", "unknown"),
    ("brand", "Generic"),
    ("model", "Unknown"),
    ("channel", "0"),
];

/// A parameterized insert paired with its values, in statement order.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertCommand {
    pub sensor_id: String,
    pub brand: String,
    pub model: String,
    pub channel: String,
    pub battery_ok: i8,
    pub temperature_c: Option<f64>,
    pub humidity: Option<f64>,
    pub raw_json: String,
}

/// Result of reshaping one bus message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A well-formed event, ready for the persistence executor.
    Command(InsertCommand),
    /// Payload was not a JSON object; the caller drops it silently.
    Skipped,
}

/// Reshape one decoded sensor event into an insert command.
///
/// Extraction never fails: every text field falls back to its entry in
/// `TEXT_DEFAULTS`, numeric fields fall back to NULL, and `battery_ok` is
/// normalized to 0/1. The untouched event is serialized into `raw_json`.
pub fn transform(payload: &Value) -> Outcome {
    let Some(event) = payload.as_object() else {
        return Outcome::Skipped;
    };

    Outcome::Command(InsertCommand {
        sensor_id: text_field(event, "id"),
        brand: text_field(event, "brand"),
        model: text_field(event, "model"),
        channel: text_field(event, "channel"),
        battery_ok: battery_flag(event.get("battery_ok")),
        temperature_c: numeric_field(event, "temperature_C"),
        humidity: numeric_field(event, "humidity"),
        raw_json: payload.to_string(),
    })
}

/// Text extraction with per-field default. Radio decoders emit `id` and
/// `channel` as numbers for some protocols, so non-string scalars are
/// rendered as their JSON text rather than rejected.
fn text_field(event: &Map<String, Value>, key: &str) -> String {
    match event.get(key) {
        None | Some(Value::Null) => default_for(key).to_owned(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn default_for(key: &str) -> &'static str {
    TEXT_DEFAULTS
        .iter()
        .find(|(field, _)| *field == key)
        .map(|(_, default)| *default)
        .unwrap_or("")
}

/// 1 exactly when the raw value is the string `"OK"` or the number 1;
/// everything else, including an absent field, is 0.
fn battery_flag(raw: Option<&Value>) -> i8 {
    let ok = match raw {
        Some(Value::String(s)) => s == "OK",
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        _ => false,
    };
    i8::from(ok)
}

fn numeric_field(event: &Map<String, Value>, key: &str) -> Option<f64> {
    event.get(key).and_then(Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn command(payload: Value) -> InsertCommand {
        match transform(&payload) {
            Outcome::Command(cmd) => cmd,
            Outcome::Skipped => panic!("expected a command for {payload}"),
        }
    }

    #[test]
    fn full_event_maps_every_field() {
        let cmd = command(json!({
            "id": "a1b2",
            "brand": "Acurite",
            "model": "Acurite-Tower",
            "channel": "A",
            "battery_ok": "OK",
            "temperature_C": 21.5,
            "humidity": 60.0,
        }));

        assert_eq!(cmd.sensor_id, "a1b2");
        assert_eq!(cmd.brand, "Acurite");
        assert_eq!(cmd.model, "Acurite-Tower");
        assert_eq!(cmd.channel, "A");
        assert_eq!(cmd.battery_ok, 1);
        assert_eq!(cmd.temperature_c, Some(21.5));
        assert_eq!(cmd.humidity, Some(60.0));
    }

    #[test]
    fn missing_fields_take_documented_defaults() {
        let cmd = command(json!({}));

        assert_eq!(cmd.sensor_id, "unknown");
        assert_eq!(cmd.brand, "Generic");
        assert_eq!(cmd.model, "Unknown");
        assert_eq!(cmd.channel, "0");
        assert_eq!(cmd.battery_ok, 0);
        assert_eq!(cmd.temperature_c, None);
        assert_eq!(cmd.humidity, None);
    }

    #[test]
    fn numeric_id_and_channel_render_as_text() {
        let cmd = command(json!({ "id": 4660, "channel": 3 }));
        assert_eq!(cmd.sensor_id, "4660");
        assert_eq!(cmd.channel, "3");
    }

    #[test]
    fn battery_ok_truth_table() {
        assert_eq!(command(json!({ "battery_ok": "OK" })).battery_ok, 1);
        assert_eq!(command(json!({ "battery_ok": 1 })).battery_ok, 1);
        assert_eq!(command(json!({ "battery_ok": 1.0 })).battery_ok, 1);
        assert_eq!(command(json!({ "battery_ok": "low" })).battery_ok, 0);
        assert_eq!(command(json!({ "battery_ok": 0 })).battery_ok, 0);
        assert_eq!(command(json!({ "battery_ok": true })).battery_ok, 0);
        assert_eq!(command(json!({})).battery_ok, 0);
    }

    #[test]
    fn non_object_payloads_are_skipped() {
        assert_eq!(transform(&Value::Null), Outcome::Skipped);
        assert_eq!(transform(&json!("not an object")), Outcome::Skipped);
        assert_eq!(transform(&json!(42)), Outcome::Skipped);
        assert_eq!(transform(&json!([{ "id": "x" }])), Outcome::Skipped);
    }

    #[test]
    fn raw_json_round_trips_to_a_superset_of_the_event() {
        let event = json!({
            "id": "a1b2",
            "temperature_C": 19.25,
            "mic": "CHECKSUM",
            "rssi": -42.1,
        });
        let cmd = command(event.clone());

        let parsed: Value = serde_json::from_str(&cmd.raw_json).unwrap();
        for (key, value) in event.as_object().unwrap() {
            assert_eq!(parsed.get(key), Some(value), "field {key} lost in raw_json");
        }
    }

    #[test]
    fn statement_has_eight_placeholders() {
        assert_eq!(INSERT_STATEMENT.matches('?').count(), 8);
    }
}
