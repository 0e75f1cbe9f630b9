//! Generic CRUD handlers for club records.
//!
//! One set of handlers serves players, coaches and coordinators. Responses
//! name their payload after the kind: `{"success": true, "players": [...]}`
//! for lists, `{"success": true, "player": {...}}` for single records.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use oeiras_cloud::{EntityStore, served};
use oeiras_core::{Coach, Coordinator, EntityKind, Player};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::routes::parse_id;
use crate::state::AppState;

/// A record kind exposed by the console.
pub trait ClubEntity: EntityKind {
    /// JSON key for a single record.
    const SINGULAR: &'static str;

    fn store(state: &AppState) -> &EntityStore<Self>;
}

impl ClubEntity for Player {
    const SINGULAR: &'static str = "player";

    fn store(state: &AppState) -> &EntityStore<Self> {
        state.players()
    }
}

impl ClubEntity for Coach {
    const SINGULAR: &'static str = "coach";

    fn store(state: &AppState) -> &EntityStore<Self> {
        state.coaches()
    }
}

impl ClubEntity for Coordinator {
    const SINGULAR: &'static str = "coordinator";

    fn store(state: &AppState) -> &EntityStore<Self> {
        state.coordinators()
    }
}

/// `{"success": true, <key>: <value>, ...extra}`
fn success_body<T: Serialize>(key: &str, value: &T, extra: &[(&str, Value)]) -> Result<Json<Value>> {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    body.insert(
        key.to_string(),
        serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))?,
    );
    for (name, value) in extra {
        body.insert((*name).to_string(), value.clone());
    }
    Ok(Json(Value::Object(body)))
}

fn not_found<K: ClubEntity>() -> AppError {
    AppError::NotFound(format!("No {} with that id", K::SINGULAR))
}

fn body<K>(payload: std::result::Result<Json<K>, JsonRejection>) -> Result<K> {
    payload
        .map(|Json(fields)| fields)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Every record of the kind. `degraded` is true when served from the fallback.
#[instrument(skip(state, admin), fields(collection = K::COLLECTION, username = %admin.username))]
pub async fn list<K: ClubEntity>(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Value>> {
    let (records, degraded) = match K::store(&state).get_all().await {
        Ok(records) => (records, false),
        Err(degraded) => (degraded.into_value(), true),
    };
    success_body(K::COLLECTION, &records, &[("degraded", Value::Bool(degraded))])
}

#[instrument(skip(state, admin), fields(collection = K::COLLECTION, username = %admin.username))]
pub async fn show<K: ClubEntity>(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let record = served(K::store(&state).get_by_id(&parse_id(&id)).await).ok_or_else(not_found::<K>)?;
    success_body(K::SINGULAR, &record, &[])
}

#[instrument(skip(state, admin, payload), fields(collection = K::COLLECTION, username = %admin.username))]
pub async fn create<K: ClubEntity>(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    payload: std::result::Result<Json<K>, JsonRejection>,
) -> Result<Json<Value>> {
    let record = K::store(&state).create(body(payload)?).await?;
    tracing::info!(id = %record.id, "Record created");
    success_body(K::SINGULAR, &record, &[])
}

/// Full replace of the editable fields.
#[instrument(skip(state, admin, payload), fields(collection = K::COLLECTION, username = %admin.username))]
pub async fn update<K: ClubEntity>(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    payload: std::result::Result<Json<K>, JsonRejection>,
) -> Result<Json<Value>> {
    let fields = body(payload)?;
    let record = K::store(&state).update(&parse_id(&id), fields).await?;
    tracing::info!(id = %record.id, "Record updated");
    success_body(K::SINGULAR, &record, &[])
}

#[instrument(skip(state, admin), fields(collection = K::COLLECTION, username = %admin.username))]
pub async fn delete<K: ClubEntity>(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_id(&id);
    if K::store(&state).delete(&id).await? {
        tracing::info!(id = %id, "Record deleted");
    } else {
        tracing::debug!(id = %id, "Record already absent");
    }
    Ok(Json(serde_json::json!({ "success": true })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_body_names_payload() {
        let Json(value) = success_body("players", &Vec::<u8>::new(), &[("degraded", Value::Bool(true))]).unwrap();
        assert_eq!(value["success"], true);
        assert!(value["players"].as_array().unwrap().is_empty());
        assert_eq!(value["degraded"], true);
    }

    #[test]
    fn test_not_found_message_uses_kind() {
        assert_eq!(not_found::<Coach>().public_message(), "No coach with that id");
    }
}
