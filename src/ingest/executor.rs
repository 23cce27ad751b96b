use sqlx::MySqlPool;
use thiserror::Error;

use super::adapter::{InsertCommand, INSERT_STATEMENT};

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("sensor reading insert failed: {0}")]
    Insert(#[from] sqlx::Error),
}

/// Write side of the pipeline: binds an `InsertCommand`'s eight parameters
/// to the fixed statement, in statement order. Row identity and `timestamp`
/// are assigned by the store.
#[derive(Clone)]
pub struct PersistenceExecutor {
    pool: MySqlPool,
}

impl PersistenceExecutor {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn execute(&self, command: InsertCommand) -> Result<(), ExecutorError> {
        sqlx::query(INSERT_STATEMENT)
            .bind(command.sensor_id)
            .bind(command.brand)
            .bind(command.model)
            .bind(command.channel)
            .bind(command.battery_ok)
            .bind(command.temperature_c)
            .bind(command.humidity)
            .bind(command.raw_json)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
