use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub db_charset: String,
    pub server_host: String,
    pub server_port: u16,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    /// Topic filter the subscriber listens on, e.g. `rtl_433/#`.
    pub mqtt_topic: String,
    pub mqtt_client_id: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            db_host: required("DB_HOST")?,
            db_port: optional("DB_PORT", "3306")
                .parse()
                .context("DB_PORT must be a valid port number")?,
            db_name: required("DB_NAME")?,
            db_user: required("DB_USER")?,
            db_password: required("DB_PASSWORD")?,
            db_charset: required("DB_CHARSET")?,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            mqtt_host: required("MQTT_HOST")?,
            mqtt_port: optional("MQTT_PORT", "1883")
                .parse()
                .context("MQTT_PORT must be a valid port number")?,
            mqtt_username: non_empty("MQTT_USERNAME"),
            mqtt_password: non_empty("MQTT_PASSWORD"),
            mqtt_topic: optional("MQTT_TOPIC", "rtl_433/#"),
            mqtt_client_id: optional("MQTT_CLIENT_ID", "radio-sensor-backend"),
        })
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required env var: {key}"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// `None` when the variable is unset or blank, so an empty `MQTT_USERNAME=`
/// in a `.env` file does not trigger broker authentication.
fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
