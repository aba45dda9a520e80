//! services/api/src/web/cart.rs
//!
//! Shopping-cart membership and the consolidated shopping-list download.
//!
//! The download endpoint is the one plain-text endpoint of the service: it
//! runs the core aggregation pipeline over the caller's cart and wraps the
//! rendered report as a file attachment.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Local;
use cookbook_core::cart::build_shopping_list;
use cookbook_core::report::{render_shopping_list, shopping_list_filename};
use std::sync::Arc;
use uuid::Uuid;

use crate::web::port_error;
use crate::web::recipes::ShortRecipePayload;
use crate::web::state::AppState;

/// POST /api/recipes/{id}/shopping_cart - Add a recipe to the cart
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Added to the cart", body = ShortRecipePayload),
        (status = 400, description = "Already in the cart"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found")
    )
)]
pub async fn add_to_cart_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let recipe = state
        .store
        .get_recipe(id)
        .await
        .map_err(|e| port_error("Failed to get recipe", e))?;

    state
        .store
        .add_to_cart(viewer, recipe.id)
        .await
        .map_err(|e| port_error("Failed to add to cart", e))?;

    Ok(Json(ShortRecipePayload::from_domain(recipe)))
}

/// DELETE /api/recipes/{id}/shopping_cart - Remove a recipe from the cart
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed from the cart"),
        (status = 400, description = "Was not in the cart"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn remove_from_cart_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let in_cart = state
        .store
        .is_in_cart(viewer, id)
        .await
        .map_err(|e| port_error("Failed to check cart", e))?;
    if !in_cart {
        return Err((
            StatusCode::BAD_REQUEST,
            "Recipe is not in the shopping cart".to_string(),
        ));
    }

    state
        .store
        .remove_from_cart(viewer, id)
        .await
        .map_err(|e| port_error("Failed to remove from cart", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/recipes/download_shopping_cart - Download the consolidated list
///
/// Always succeeds for an authenticated caller; an empty cart downloads an
/// empty file rather than erroring.
#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    responses(
        (status = 200, description = "The shopping list as a text attachment", body = String, content_type = "text/plain"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "A cart recipe no longer exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn download_shopping_cart_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = state
        .store
        .get_user(viewer)
        .await
        .map_err(|e| port_error("Failed to get user", e))?;

    let entries = build_shopping_list(state.cart.as_ref(), viewer)
        .await
        .map_err(|e| port_error("Failed to build shopping list", e))?;

    let body = render_shopping_list(&entries);
    let filename = shopping_list_filename(&user.username, Local::now());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}
