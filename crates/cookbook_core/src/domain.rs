//! crates/cookbook_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// A recipe tag (e.g. "breakfast"). Read-only reference data.
#[derive(Debug, Clone)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// An ingredient with its measurement unit. Immutable reference data.
///
/// Name + unit pairs are not globally unique: "salt"/"g" and "salt"/"tsp"
/// may both exist as separate rows, and must stay distinct everywhere
/// they appear.
#[derive(Debug, Clone)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
}

/// A published recipe.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
}

/// One ingredient entry of a specific recipe, as returned by the
/// ingredient-line fetch: the ingredient's identity plus the amount the
/// recipe calls for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientLine {
    pub ingredient_id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// The write-side shape of an ingredient line: ingredient id + amount.
#[derive(Debug, Clone)]
pub struct NewIngredientLine {
    pub ingredient_id: Uuid,
    pub amount: i32,
}

/// Everything needed to create (or wholesale-replace on update) a recipe.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub tag_ids: Vec<Uuid>,
    pub ingredients: Vec<NewIngredientLine>,
}
