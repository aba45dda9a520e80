//! crates/cookbook_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    AuthSession, Ingredient, IngredientLine, NewRecipe, Recipe, Tag, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Shopping-Cart Source Port
//=========================================================================================

/// The two lookups the shopping-list pipeline consumes.
///
/// Kept separate from [`RecipeStore`] so the aggregation logic can be tested
/// against a small in-memory fake.
#[async_trait]
pub trait CartSource: Send + Sync {
    /// Returns the ids of the recipes currently in the user's cart, in
    /// insertion order. An empty cart yields an empty vec, not an error.
    async fn cart_recipe_ids(&self, user_id: Uuid) -> PortResult<Vec<Uuid>>;

    /// Returns every ingredient line of one recipe, in the recipe's own line
    /// order. Fails with `NotFound` if the recipe does not exist.
    async fn ingredient_lines(&self, recipe_id: Uuid) -> PortResult<Vec<IngredientLine>>;
}

//=========================================================================================
// Recipe Store Port
//=========================================================================================

/// Filter parameters for the recipe listing.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Match recipes carrying any of these tag slugs.
    pub tag_slugs: Vec<String>,
    pub author: Option<Uuid>,
    /// `Some((user, true))` keeps only that user's favorites,
    /// `Some((user, false))` excludes them.
    pub favorited_by: Option<(Uuid, bool)>,
    pub in_cart_of: Option<(Uuid, bool)>,
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    // --- User Management ---
    async fn create_user(
        &self,
        email: &str,
        username: &str,
        first_name: &str,
        last_name: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    async fn list_users(&self, limit: i64, offset: i64) -> PortResult<Vec<User>>;

    async fn count_users(&self) -> PortResult<i64>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_password_hash(&self, user_id: Uuid) -> PortResult<String>;

    async fn set_password_hash(&self, user_id: Uuid, hashed_password: &str) -> PortResult<()>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<AuthSession>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Tags and Ingredients (read-only reference data) ---
    async fn list_tags(&self) -> PortResult<Vec<Tag>>;

    async fn get_tag(&self, tag_id: Uuid) -> PortResult<Tag>;

    /// Lists ingredients, optionally narrowed to names starting with the
    /// given prefix (case-insensitive).
    async fn list_ingredients(&self, name_prefix: Option<&str>) -> PortResult<Vec<Ingredient>>;

    async fn get_ingredient(&self, ingredient_id: Uuid) -> PortResult<Ingredient>;

    // --- Recipes ---
    async fn create_recipe(&self, author_id: Uuid, recipe: &NewRecipe) -> PortResult<Recipe>;

    async fn get_recipe(&self, recipe_id: Uuid) -> PortResult<Recipe>;

    /// Replaces the recipe's fields, tag set and ingredient lines wholesale.
    async fn update_recipe(&self, recipe_id: Uuid, recipe: &NewRecipe) -> PortResult<Recipe>;

    async fn delete_recipe(&self, recipe_id: Uuid) -> PortResult<()>;

    /// Lists recipes matching the filter, newest first.
    async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        limit: i64,
        offset: i64,
    ) -> PortResult<Vec<Recipe>>;

    async fn count_recipes(&self, filter: &RecipeFilter) -> PortResult<i64>;

    async fn recipe_tags(&self, recipe_id: Uuid) -> PortResult<Vec<Tag>>;

    /// The author's most recent recipes, newest first.
    async fn recipes_by_author(&self, author_id: Uuid, limit: i64) -> PortResult<Vec<Recipe>>;

    async fn count_recipes_by_author(&self, author_id: Uuid) -> PortResult<i64>;

    // --- Favorites ---
    async fn is_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<bool>;

    async fn add_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()>;

    async fn remove_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()>;

    // --- Cart Membership ---
    async fn is_in_cart(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<bool>;

    async fn add_to_cart(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()>;

    async fn remove_from_cart(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()>;

    // --- Subscriptions ---
    async fn is_subscribed(&self, user_id: Uuid, author_id: Uuid) -> PortResult<bool>;

    async fn subscribe(&self, user_id: Uuid, author_id: Uuid) -> PortResult<()>;

    async fn unsubscribe(&self, user_id: Uuid, author_id: Uuid) -> PortResult<()>;

    /// The authors the user is subscribed to, in subscription order.
    async fn list_subscriptions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> PortResult<Vec<User>>;

    async fn count_subscriptions(&self, user_id: Uuid) -> PortResult<i64>;
}
