pub mod adapter;
pub mod executor;

use std::time::Duration;

use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use serde_json::Value;
use sqlx::MySqlPool;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;

use adapter::Outcome;
use executor::PersistenceExecutor;

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// MQTT subscriber feeding decoded sensor events through the adapter into
/// the persistence executor. Spawn via `tokio::spawn(service.run())`.
pub struct IngestService {
    config: Config,
    executor: PersistenceExecutor,
}

impl IngestService {
    pub fn new(config: &Config, pool: MySqlPool) -> Self {
        Self {
            config: config.clone(),
            executor: PersistenceExecutor::new(pool),
        }
    }

    /// Runs the subscribe/consume loop indefinitely, reconnecting after a
    /// fixed delay on any broker error.
    pub async fn run(self) {
        loop {
            let mut options = MqttOptions::new(
                self.config.mqtt_client_id.clone(),
                self.config.mqtt_host.clone(),
                self.config.mqtt_port,
            );
            options.set_keep_alive(Duration::from_secs(15));
            if let Some(username) = &self.config.mqtt_username {
                options.set_credentials(
                    username.clone(),
                    self.config.mqtt_password.clone().unwrap_or_default(),
                );
            }

            let (client, mut eventloop) = AsyncClient::new(options, 64);
            if let Err(e) = client
                .subscribe(self.config.mqtt_topic.clone(), QoS::AtMostOnce)
                .await
            {
                warn!(error = %e, "MQTT subscribe failed; retrying");
                sleep(RECONNECT_DELAY).await;
                continue;
            }

            info!(
                host = %self.config.mqtt_host,
                topic = %self.config.mqtt_topic,
                "MQTT subscriber started"
            );

            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Incoming::Publish(publish))) => {
                        self.handle_message(&publish.topic, &publish.payload).await;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "MQTT connection lost; reconnecting");
                        break;
                    }
                }
            }

            sleep(RECONNECT_DELAY).await;
        }
    }

    /// One message, one insert. Malformed payloads are dropped without
    /// surfacing an error; executor failures are logged and the loop goes on.
    async fn handle_message(&self, topic: &str, payload: &[u8]) {
        let Ok(event) = serde_json::from_slice::<Value>(payload) else {
            debug!(topic = %topic, "Dropping payload that is not valid JSON");
            return;
        };

        match adapter::transform(&event) {
            Outcome::Command(command) => {
                if let Err(e) = self.executor.execute(command).await {
                    error!(topic = %topic, error = %e, "Failed to persist sensor event");
                }
            }
            Outcome::Skipped => {
                debug!(topic = %topic, "Dropping payload that is not a JSON object");
            }
        }
    }
}
