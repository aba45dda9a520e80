//! services/api/src/web/recipes.rs
//!
//! Recipe CRUD, list filtering and the favorite toggle.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use cookbook_core::domain::{NewIngredientLine, NewRecipe, Recipe};
use cookbook_core::ports::RecipeFilter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::middleware::maybe_authenticated;
use crate::web::pagination::{Page, PageQuery};
use crate::web::port_error;
use crate::web::state::AppState;
use crate::web::tags::TagPayload;
use crate::web::users::{user_payload, UserPayload};

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// One ingredient line of a recipe payload, flattened to the ingredient's
/// fields plus the amount.
#[derive(Serialize, ToSchema)]
pub struct RecipeIngredientPayload {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Serialize, ToSchema)]
pub struct RecipePayload {
    pub id: Uuid,
    pub tags: Vec<TagPayload>,
    pub author: UserPayload,
    pub ingredients: Vec<RecipeIngredientPayload>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// The abbreviated recipe form used by favorites, the cart toggle and
/// subscription previews.
#[derive(Serialize, ToSchema)]
pub struct ShortRecipePayload {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl ShortRecipePayload {
    pub fn from_domain(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct RecipeIngredientInput {
    pub id: Uuid,
    pub amount: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct RecipeRequest {
    pub ingredients: Vec<RecipeIngredientInput>,
    pub tags: Vec<Uuid>,
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

//=========================================================================================
// Validation and Payload Building
//=========================================================================================

fn validate_recipe(req: &RecipeRequest) -> Result<NewRecipe, String> {
    if req.name.is_empty() {
        return Err("Recipe name is required".to_string());
    }
    if req.cooking_time <= 0 {
        return Err("Cooking time must be a positive number of minutes".to_string());
    }
    if req.ingredients.is_empty() {
        return Err("At least one ingredient is required".to_string());
    }

    let mut seen: Vec<Uuid> = Vec::with_capacity(req.ingredients.len());
    for line in &req.ingredients {
        if line.amount <= 0 {
            return Err("Ingredient amounts must be positive".to_string());
        }
        if seen.contains(&line.id) {
            return Err("An ingredient cannot be added twice".to_string());
        }
        seen.push(line.id);
    }

    Ok(NewRecipe {
        name: req.name.clone(),
        image: req.image.clone(),
        text: req.text.clone(),
        cooking_time: req.cooking_time,
        tag_ids: req.tags.clone(),
        ingredients: req
            .ingredients
            .iter()
            .map(|line| NewIngredientLine {
                ingredient_id: line.id,
                amount: line.amount,
            })
            .collect(),
    })
}

/// Assembles the full recipe payload: tags, author, ingredient lines and the
/// caller-specific favorite/cart flags.
pub async fn recipe_payload(
    state: &AppState,
    viewer: Option<Uuid>,
    recipe: Recipe,
) -> Result<RecipePayload, (StatusCode, String)> {
    let tags = state
        .store
        .recipe_tags(recipe.id)
        .await
        .map_err(|e| port_error("Failed to load recipe tags", e))?;

    let author = state
        .store
        .get_user(recipe.author_id)
        .await
        .map_err(|e| port_error("Failed to load recipe author", e))?;
    let author = user_payload(state, viewer, author).await?;

    let lines = state
        .cart
        .ingredient_lines(recipe.id)
        .await
        .map_err(|e| port_error("Failed to load ingredient lines", e))?;

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer_id) => (
            state
                .store
                .is_favorite(viewer_id, recipe.id)
                .await
                .map_err(|e| port_error("Failed to check favorite", e))?,
            state
                .store
                .is_in_cart(viewer_id, recipe.id)
                .await
                .map_err(|e| port_error("Failed to check cart", e))?,
        ),
        None => (false, false),
    };

    Ok(RecipePayload {
        id: recipe.id,
        tags: tags.into_iter().map(TagPayload::from_domain).collect(),
        author,
        ingredients: lines
            .into_iter()
            .map(|line| RecipeIngredientPayload {
                id: line.ingredient_id,
                name: line.name,
                measurement_unit: line.measurement_unit,
                amount: line.amount,
            })
            .collect(),
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

//=========================================================================================
// List Query Parsing
//=========================================================================================

/// The recipe listing's query parameters. `tags` repeats, which
/// `serde_urlencoded` cannot collect into a `Vec`, so the raw pairs are
/// parsed by hand.
#[derive(Debug, Default, PartialEq)]
pub struct RecipeListQuery {
    pub page: PageQuery,
    pub tags: Vec<String>,
    pub author: Option<Uuid>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

pub fn parse_recipe_list_query(pairs: &[(String, String)]) -> RecipeListQuery {
    let mut query = RecipeListQuery::default();
    for (key, value) in pairs {
        match key.as_str() {
            "page" => query.page.page = value.parse().ok(),
            "limit" => query.page.limit = value.parse().ok(),
            "tags" => query.tags.push(value.clone()),
            "author" => query.author = value.parse().ok(),
            "is_favorited" => query.is_favorited = parse_flag(value),
            "is_in_shopping_cart" => query.is_in_shopping_cart = parse_flag(value),
            _ => {}
        }
    }
    query
}

fn build_filter(query: &RecipeListQuery, viewer: Option<Uuid>) -> RecipeFilter {
    RecipeFilter {
        tag_slugs: query.tags.clone(),
        author: query.author,
        // The caller-relative flags only mean something for an
        // authenticated caller; anonymous requests ignore them.
        favorited_by: match (viewer, query.is_favorited) {
            (Some(viewer_id), Some(wanted)) => Some((viewer_id, wanted)),
            _ => None,
        },
        in_cart_of: match (viewer, query.is_in_shopping_cart) {
            (Some(viewer_id), Some(wanted)) => Some((viewer_id, wanted)),
            _ => None,
        },
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/recipes - Paginated recipe list, newest first
#[utoipa::path(
    get,
    path = "/api/recipes",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number"),
        ("limit" = Option<i64>, Query, description = "Page size"),
        ("tags" = Option<String>, Query, description = "Tag slug, repeatable"),
        ("author" = Option<Uuid>, Query, description = "Author id"),
        ("is_favorited" = Option<i32>, Query, description = "0/1, authenticated callers only"),
        ("is_in_shopping_cart" = Option<i32>, Query, description = "0/1, authenticated callers only")
    ),
    responses(
        (status = 200, description = "A page of recipes"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_recipes_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let viewer = maybe_authenticated(&state, &headers).await;
    let query = parse_recipe_list_query(&pairs);
    let (page, limit, offset) = query.page.resolve(state.config.default_page_size);
    let filter = build_filter(&query, viewer);

    let recipes = state
        .store
        .list_recipes(&filter, limit, offset)
        .await
        .map_err(|e| port_error("Failed to list recipes", e))?;
    let count = state
        .store
        .count_recipes(&filter)
        .await
        .map_err(|e| port_error("Failed to count recipes", e))?;

    let mut results = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        results.push(recipe_payload(&state, viewer, recipe).await?);
    }

    Ok(Json(Page::new(results, count, page, limit)))
}

/// GET /api/recipes/{id} - Recipe detail
#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "The recipe", body = RecipePayload),
        (status = 404, description = "Recipe not found")
    )
)]
pub async fn get_recipe_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let viewer = maybe_authenticated(&state, &headers).await;
    let recipe = state
        .store
        .get_recipe(id)
        .await
        .map_err(|e| port_error("Failed to get recipe", e))?;
    let payload = recipe_payload(&state, viewer, recipe).await?;
    Ok(Json(payload))
}

/// POST /api/recipes - Publish a new recipe
#[utoipa::path(
    post,
    path = "/api/recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipePayload),
        (status = 400, description = "Invalid recipe"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_recipe_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
    Json(req): Json<RecipeRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let new_recipe = validate_recipe(&req).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let recipe = state
        .store
        .create_recipe(viewer, &new_recipe)
        .await
        .map_err(|e| port_error("Failed to create recipe", e))?;

    let payload = recipe_payload(&state, Some(viewer), recipe).await?;
    Ok((StatusCode::CREATED, Json(payload)))
}

/// PATCH /api/recipes/{id} - Update a recipe (author only)
///
/// Tags and ingredient lines are replaced wholesale by the request body.
#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipePayload),
        (status = 400, description = "Invalid recipe"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found")
    )
)]
pub async fn update_recipe_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecipeRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let new_recipe = validate_recipe(&req).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let existing = state
        .store
        .get_recipe(id)
        .await
        .map_err(|e| port_error("Failed to get recipe", e))?;
    if existing.author_id != viewer {
        return Err((
            StatusCode::FORBIDDEN,
            "Only the author can edit a recipe".to_string(),
        ));
    }

    let recipe = state
        .store
        .update_recipe(id, &new_recipe)
        .await
        .map_err(|e| port_error("Failed to update recipe", e))?;

    let payload = recipe_payload(&state, Some(viewer), recipe).await?;
    Ok(Json(payload))
}

/// DELETE /api/recipes/{id} - Delete a recipe (author only)
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found")
    )
)]
pub async fn delete_recipe_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let existing = state
        .store
        .get_recipe(id)
        .await
        .map_err(|e| port_error("Failed to get recipe", e))?;
    if existing.author_id != viewer {
        return Err((
            StatusCode::FORBIDDEN,
            "Only the author can delete a recipe".to_string(),
        ));
    }

    state
        .store
        .delete_recipe(id)
        .await
        .map_err(|e| port_error("Failed to delete recipe", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/{id}/favorite - Add a recipe to favorites
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Added to favorites", body = ShortRecipePayload),
        (status = 400, description = "Already in favorites"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found")
    )
)]
pub async fn add_favorite_handler(
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
        .add_favorite(viewer, recipe.id)
        .await
        .map_err(|e| port_error("Failed to add favorite", e))?;

    Ok(Json(ShortRecipePayload::from_domain(recipe)))
}

/// DELETE /api/recipes/{id}/favorite - Remove a recipe from favorites
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed from favorites"),
        (status = 400, description = "Was not in favorites"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn remove_favorite_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let favorited = state
        .store
        .is_favorite(viewer, id)
        .await
        .map_err(|e| port_error("Failed to check favorite", e))?;
    if !favorited {
        return Err((
            StatusCode::BAD_REQUEST,
            "Recipe is not in favorites".to_string(),
        ));
    }

    state
        .store
        .remove_favorite(viewer, id)
        .await
        .map_err(|e| port_error("Failed to remove favorite", e))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RecipeRequest {
        RecipeRequest {
            ingredients: vec![RecipeIngredientInput {
                id: Uuid::new_v4(),
                amount: 200,
            }],
            tags: vec![],
            image: "recipes/cake.png".to_string(),
            name: "Cake".to_string(),
            text: "Mix and bake.".to_string(),
            cooking_time: 40,
        }
    }

    #[test]
    fn accepts_a_well_formed_recipe() {
        assert!(validate_recipe(&request()).is_ok());
    }

    #[test]
    fn rejects_zero_cooking_time() {
        let mut req = request();
        req.cooking_time = 0;
        assert!(validate_recipe(&req).is_err());
    }

    #[test]
    fn rejects_empty_ingredient_list() {
        let mut req = request();
        req.ingredients.clear();
        assert!(validate_recipe(&req).is_err());
    }

    #[test]
    fn rejects_duplicate_ingredients_and_zero_amounts() {
        let mut req = request();
        let id = Uuid::new_v4();
        req.ingredients = vec![
            RecipeIngredientInput { id, amount: 10 },
            RecipeIngredientInput { id, amount: 20 },
        ];
        assert!(validate_recipe(&req).is_err());

        let mut req = request();
        req.ingredients[0].amount = 0;
        assert!(validate_recipe(&req).is_err());
    }

    #[test]
    fn parses_repeated_tags_and_flags() {
        let pairs = vec![
            ("tags".to_string(), "breakfast".to_string()),
            ("tags".to_string(), "vegan".to_string()),
            ("is_favorited".to_string(), "1".to_string()),
            ("is_in_shopping_cart".to_string(), "0".to_string()),
            ("page".to_string(), "2".to_string()),
            ("limit".to_string(), "12".to_string()),
        ];
        let query = parse_recipe_list_query(&pairs);
        assert_eq!(query.tags, vec!["breakfast", "vegan"]);
        assert_eq!(query.is_favorited, Some(true));
        assert_eq!(query.is_in_shopping_cart, Some(false));
        assert_eq!(query.page.page, Some(2));
        assert_eq!(query.page.limit, Some(12));
    }

    #[test]
    fn ignores_unknown_parameters_and_bad_flags() {
        let pairs = vec![
            ("tags".to_string(), "soup".to_string()),
            ("is_favorited".to_string(), "maybe".to_string()),
            ("search".to_string(), "borscht".to_string()),
        ];
        let query = parse_recipe_list_query(&pairs);
        assert_eq!(query.tags, vec!["soup"]);
        assert_eq!(query.is_favorited, None);
        assert_eq!(query.author, None);
    }
}
