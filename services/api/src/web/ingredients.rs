//! services/api/src/web/ingredients.rs
//!
//! Read-only ingredient endpoints with a name-prefix search filter.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use cookbook_core::domain::Ingredient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::port_error;
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct IngredientPayload {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
}

impl IngredientPayload {
    pub fn from_domain(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

#[derive(Deserialize)]
pub struct IngredientQuery {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

/// GET /api/ingredients - List ingredients, optionally filtered by name prefix
#[utoipa::path(
    get,
    path = "/api/ingredients",
    params(("name" = Option<String>, Query, description = "Case-insensitive name prefix")),
    responses(
        (status = 200, description = "Matching ingredients", body = [IngredientPayload]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_ingredients_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IngredientQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let ingredients = state
        .store
        .list_ingredients(query.name.as_deref())
        .await
        .map_err(|e| port_error("Failed to list ingredients", e))?;
    let payload: Vec<IngredientPayload> = ingredients
        .into_iter()
        .map(IngredientPayload::from_domain)
        .collect();
    Ok(Json(payload))
}

/// GET /api/ingredients/{id} - Retrieve one ingredient
#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    params(("id" = Uuid, Path, description = "Ingredient id")),
    responses(
        (status = 200, description = "The ingredient", body = IngredientPayload),
        (status = 404, description = "Ingredient not found")
    )
)]
pub async fn get_ingredient_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let ingredient = state
        .store
        .get_ingredient(id)
        .await
        .map_err(|e| port_error("Failed to get ingredient", e))?;
    Ok(Json(IngredientPayload::from_domain(ingredient)))
}
