use std::collections::BTreeMap;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::{Connection, MySqlConnection};
use utoipa::OpenApi;

use super::{
    dto::{AliasUpsertRequest, SensorReadingDto},
    errors::AppError,
    ApiState,
};
use crate::db::models::{SensorAlias, SensorReadingRow};

/// Latest reading per sensor: self-join against the per-sensor maximum
/// timestamp. Two rows sharing a sensor's maximum timestamp both match;
/// the tie-break is left to the query engine.
const LATEST_READINGS_SQL: &str = "\
    SELECT s1.* \
    FROM sensors_data s1 \
    INNER JOIN ( \
        SELECT sensor_id, MAX(timestamp) AS max_ts \
        FROM sensors_data \
        GROUP BY sensor_id \
    ) s2 ON s1.sensor_id = s2.sensor_id AND s1.timestamp = s2.max_ts \
    ORDER BY s1.timestamp DESC";

/// Fetch the latest reading for every known sensor (one row per sensor).
///
/// Opens its own database connection so that an unreachable store stays a
/// per-request condition. A connection failure is answered with HTTP 200 and
/// an `{"error": "Connection failed: ..."}` body — long-standing dashboard
/// clients depend on that shape, so it is kept as-is.
#[utoipa::path(
    get,
    path = "/api/data",
    responses(
        (status = 200, description = "Latest reading per sensor, newest first; or a connection-failure object", body = Vec<SensorReadingDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sensors"
)]
pub async fn get_latest_readings(State(state): State<ApiState>) -> Result<Response, AppError> {
    let mut conn = match MySqlConnection::connect_with(&state.connect_options).await {
        Ok(conn) => conn,
        Err(e) => {
            let body = Json(json!({ "error": format!("Connection failed: {e}") }));
            return Ok(body.into_response());
        }
    };

    let result = sqlx::query_as::<_, SensorReadingRow>(LATEST_READINGS_SQL)
        .fetch_all(&mut conn)
        .await;
    // Close regardless of the query outcome; a failed close only loses the
    // graceful quit, the socket is released either way.
    let _ = conn.close().await;

    let rows = result?;
    let dtos: Vec<SensorReadingDto> = rows.into_iter().map(Into::into).collect();
    Ok(Json(dtos).into_response())
}

/// Fetch all sensor aliases as a `sensor_id` → `alias` object.
#[utoipa::path(
    get,
    path = "/api/aliases",
    responses(
        (status = 200, description = "All stored aliases", body = BTreeMap<String, String>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sensors"
)]
pub async fn get_aliases(
    State(state): State<ApiState>,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    let rows: Vec<SensorAlias> =
        sqlx::query_as("SELECT sensor_id, alias FROM sensor_aliases")
            .fetch_all(&state.pool)
            .await?;

    Ok(Json(rows.into_iter().map(|a| (a.sensor_id, a.alias)).collect()))
}

/// Upsert an alias for a sensor; an absent or empty alias deletes it.
#[utoipa::path(
    post,
    path = "/api/aliases",
    request_body = AliasUpsertRequest,
    responses(
        (status = 200, description = "Alias stored or removed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sensors"
)]
pub async fn set_alias(
    State(state): State<ApiState>,
    Json(request): Json<AliasUpsertRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    match request.alias.as_deref().filter(|a| !a.is_empty()) {
        Some(alias) => {
            sqlx::query(
                "INSERT INTO sensor_aliases (sensor_id, alias) VALUES (?, ?) \
                 ON DUPLICATE KEY UPDATE alias = VALUES(alias)",
            )
            .bind(&request.sensor_id)
            .bind(alias)
            .execute(&state.pool)
            .await?;
        }
        None => {
            sqlx::query("DELETE FROM sensor_aliases WHERE sensor_id = ?")
                .bind(&request.sensor_id)
                .execute(&state.pool)
                .await?;
        }
    }

    Ok(Json(json!({ "status": "success" })))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec struct (used in api/mod.rs)
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(get_latest_readings, get_aliases, set_alias),
    components(schemas(SensorReadingDto, AliasUpsertRequest)),
    tags((name = "sensors", description = "Sensor reading and alias endpoints")),
    info(
        title = "Radio Sensor Backend API",
        version = "0.1.0",
        description = "REST API over 433MHz sensor readings"
    )
)]
pub struct ApiDoc;
