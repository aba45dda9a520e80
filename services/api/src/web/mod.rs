pub mod auth;
pub mod cart;
pub mod ingredients;
pub mod middleware;
pub mod pagination;
pub mod recipes;
pub mod state;
pub mod tags;
pub mod users;

use axum::http::StatusCode;
use cookbook_core::ports::PortError;
use tracing::error;
use utoipa::OpenApi;

pub use middleware::require_auth;

/// Maps a port error to the handler-level `(status, message)` pair, logging
/// the unexpected ones.
pub(crate) fn port_error(context: &str, e: PortError) -> (StatusCode, String) {
    match e {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(msg) => {
            error!("{}: {}", context, msg);
            (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    }
}

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        users::signup_handler,
        users::list_users_handler,
        users::me_handler,
        users::get_user_handler,
        users::set_password_handler,
        users::subscribe_handler,
        users::unsubscribe_handler,
        users::list_subscriptions_handler,
        auth::login_handler,
        auth::logout_handler,
        tags::list_tags_handler,
        tags::get_tag_handler,
        ingredients::list_ingredients_handler,
        ingredients::get_ingredient_handler,
        recipes::list_recipes_handler,
        recipes::get_recipe_handler,
        recipes::create_recipe_handler,
        recipes::update_recipe_handler,
        recipes::delete_recipe_handler,
        recipes::add_favorite_handler,
        recipes::remove_favorite_handler,
        cart::add_to_cart_handler,
        cart::remove_from_cart_handler,
        cart::download_shopping_cart_handler,
    ),
    components(
        schemas(
            auth::LoginRequest,
            auth::AuthResponse,
            users::SignupRequest,
            users::UserPayload,
            users::UserSubPayload,
            users::ChangePasswordRequest,
            tags::TagPayload,
            ingredients::IngredientPayload,
            recipes::RecipePayload,
            recipes::RecipeIngredientPayload,
            recipes::ShortRecipePayload,
            recipes::RecipeRequest,
            recipes::RecipeIngredientInput,
        )
    ),
    tags(
        (name = "Cookbook API", description = "Recipe sharing, favorites, subscriptions and the shopping-cart download.")
    )
)]
pub struct ApiDoc;
