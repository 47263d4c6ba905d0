//! Handlers for the recipe CRUD API.
//!
//! Each handler makes a single store call. Create and update payloads go
//! through the field validator first; a payload with violations never reaches
//! storage.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::AppError;
use crate::model::{Recipe, RecipeId};
use crate::state::AppState;
use crate::validation::{validate_new, validate_patch};

/// Body returned by a successful delete
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Create a recipe from a validated payload.
#[instrument(name = "recipes::create", skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Recipe>), AppError> {
    let payload = json_body(payload)?;
    let recipe = validate_new(&payload).inspect_err(|errors| {
        tracing::debug!(%errors, "Rejected recipe payload");
    })?;

    let created = state.store.create(recipe).await?;
    tracing::info!(id = %created.id, title = %created.title, "Recipe created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// List every recipe.
#[instrument(name = "recipes::list", skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, AppError> {
    let recipes = state.store.find_all().await?;
    Ok(Json(recipes))
}

/// Fetch one recipe; an unknown id yields `null`.
#[instrument(name = "recipes::get", skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Recipe>>, AppError> {
    let id: RecipeId = id.parse()?;
    let recipe = state.store.find_by_id(id).await?;
    Ok(Json(recipe))
}

/// Apply a partial update and return the updated record.
#[instrument(name = "recipes::update", skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Recipe>), AppError> {
    let id: RecipeId = id.parse()?;
    let payload = json_body(payload)?;
    let patch = validate_patch(&payload)?;

    let updated = state
        .store
        .find_by_id_and_update(id, patch)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(id = %updated.id, "Recipe updated");

    Ok((StatusCode::CREATED, Json(updated)))
}

/// Remove a recipe, echoing what was removed.
#[instrument(name = "recipes::delete", skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<DeleteResponse>), AppError> {
    let id: RecipeId = id.parse()?;

    let removed = state
        .store
        .find_by_id_and_delete(id)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(id = %removed.id, title = %removed.title, "Recipe deleted");

    Ok((
        StatusCode::ACCEPTED,
        Json(DeleteResponse {
            message: format!("Recipe deleted: {}", removed),
        }),
    ))
}
