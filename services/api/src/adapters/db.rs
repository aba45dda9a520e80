//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `RecipeStore` and `CartSource` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cookbook_core::domain::{
    AuthSession, Ingredient, IngredientLine, NewRecipe, Recipe, Tag, User, UserCredentials,
};
use cookbook_core::ports::{CartSource, PortError, PortResult, RecipeFilter, RecipeStore};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `RecipeStore` and `CartSource` ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps a sqlx error to a port error, turning unique-constraint violations
/// into `Conflict` with the given message.
fn insert_error(e: sqlx::Error, conflict_msg: &str) -> PortError {
    if let Some(db_err) = e.as_database_error() {
        if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return PortError::Conflict(conflict_msg.to_string());
        }
    }
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(e: sqlx::Error, what: String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct TagRecord {
    id: Uuid,
    name: String,
    color: String,
    slug: String,
}
impl TagRecord {
    fn to_domain(self) -> Tag {
        Tag {
            id: self.id,
            name: self.name,
            color: self.color,
            slug: self.slug,
        }
    }
}

#[derive(FromRow)]
struct IngredientRecord {
    id: Uuid,
    name: String,
    measurement_unit: String,
}
impl IngredientRecord {
    fn to_domain(self) -> Ingredient {
        Ingredient {
            id: self.id,
            name: self.name,
            measurement_unit: self.measurement_unit,
        }
    }
}

#[derive(FromRow)]
struct RecipeRecord {
    id: Uuid,
    author_id: Uuid,
    name: String,
    image: String,
    text: String,
    cooking_time: i32,
    created_at: DateTime<Utc>,
}
impl RecipeRecord {
    fn to_domain(self) -> Recipe {
        Recipe {
            id: self.id,
            author_id: self.author_id,
            name: self.name,
            image: self.image,
            text: self.text,
            cooking_time: self.cooking_time,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct LineRecord {
    ingredient_id: Uuid,
    name: String,
    measurement_unit: String,
    amount: i32,
}
impl LineRecord {
    fn to_domain(self) -> IngredientLine {
        IngredientLine {
            ingredient_id: self.ingredient_id,
            name: self.name,
            measurement_unit: self.measurement_unit,
            amount: self.amount,
        }
    }
}

const RECIPE_COLUMNS: &str = "id, author_id, name, image, text, cooking_time, created_at";

/// Appends the filter's predicates to a query ending in `WHERE TRUE`.
fn push_recipe_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &RecipeFilter) {
    if !filter.tag_slugs.is_empty() {
        builder.push(
            " AND r.id IN (SELECT rt.recipe_id FROM recipe_tags rt \
             JOIN tags t ON t.id = rt.tag_id WHERE t.slug = ANY(",
        );
        builder.push_bind(filter.tag_slugs.clone());
        builder.push("))");
    }
    if let Some(author) = filter.author {
        builder.push(" AND r.author_id = ");
        builder.push_bind(author);
    }
    if let Some((user_id, wanted)) = filter.favorited_by {
        builder.push(if wanted { " AND EXISTS" } else { " AND NOT EXISTS" });
        builder.push(" (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ");
        builder.push_bind(user_id);
        builder.push(")");
    }
    if let Some((user_id, wanted)) = filter.in_cart_of {
        builder.push(if wanted { " AND EXISTS" } else { " AND NOT EXISTS" });
        builder.push(" (SELECT 1 FROM cart_items c WHERE c.recipe_id = r.id AND c.user_id = ");
        builder.push_bind(user_id);
        builder.push(")");
    }
}

//=========================================================================================
// `RecipeStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecipeStore for DbAdapter {
    async fn create_user(
        &self,
        email: &str,
        username: &str,
        first_name: &str,
        last_name: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (email, username, first_name, last_name, hashed_password) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, username, first_name, last_name, email",
        )
        .bind(email)
        .bind(username)
        .bind(first_name)
        .bind(last_name)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(e, "A user with this email or username already exists"))?;
        Ok(record.to_domain())
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, first_name, last_name, email FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn list_users(&self, limit: i64, offset: i64) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, first_name, last_name, email FROM users \
             ORDER BY created_at ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn count_users(&self) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", email)))?;
        Ok(record.to_domain())
    }

    async fn get_password_hash(&self, user_id: Uuid) -> PortResult<String> {
        sqlx::query_scalar::<_, String>("SELECT hashed_password FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", user_id)))
    }

    async fn set_password_hash(&self, user_id: Uuid, hashed_password: &str) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET hashed_password = $1 WHERE id = $2")
            .bind(hashed_password)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<AuthSession> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(AuthSession {
            id: session_id.to_string(),
            user_id,
            expires_at,
        })
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => PortError::Unexpected(e.to_string()),
        })
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn list_tags(&self) -> PortResult<Vec<Tag>> {
        let records =
            sqlx::query_as::<_, TagRecord>("SELECT id, name, color, slug FROM tags ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_tag(&self, tag_id: Uuid) -> PortResult<Tag> {
        let record = sqlx::query_as::<_, TagRecord>(
            "SELECT id, name, color, slug FROM tags WHERE id = $1",
        )
        .bind(tag_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Tag {} not found", tag_id)))?;
        Ok(record.to_domain())
    }

    async fn list_ingredients(&self, name_prefix: Option<&str>) -> PortResult<Vec<Ingredient>> {
        let records = match name_prefix {
            Some(prefix) => {
                // Escape LIKE wildcards so the prefix is matched literally.
                let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
                sqlx::query_as::<_, IngredientRecord>(
                    "SELECT id, name, measurement_unit FROM ingredients \
                     WHERE name ILIKE $1 ORDER BY name",
                )
                .bind(format!("{}%", escaped))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, IngredientRecord>(
                    "SELECT id, name, measurement_unit FROM ingredients ORDER BY name",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_ingredient(&self, ingredient_id: Uuid) -> PortResult<Ingredient> {
        let record = sqlx::query_as::<_, IngredientRecord>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(ingredient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            not_found_or_unexpected(e, format!("Ingredient {} not found", ingredient_id))
        })?;
        Ok(record.to_domain())
    }

    async fn create_recipe(&self, author_id: Uuid, recipe: &NewRecipe) -> PortResult<Recipe> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let record = sqlx::query_as::<_, RecipeRecord>(
            "INSERT INTO recipes (author_id, name, image, text, cooking_time) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, author_id, name, image, text, cooking_time, created_at",
        )
        .bind(author_id)
        .bind(&recipe.name)
        .bind(&recipe.image)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        for tag_id in &recipe.tag_ids {
            sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
                .bind(record.id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| insert_error(e, "Duplicate tag on recipe"))?;
        }

        for line in &recipe.ingredients {
            sqlx::query(
                "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) \
                 VALUES ($1, $2, $3)",
            )
            .bind(record.id)
            .bind(line.ingredient_id)
            .bind(line.amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| insert_error(e, "An ingredient appears twice in the recipe"))?;
        }

        tx.commit()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> PortResult<Recipe> {
        let record = sqlx::query_as::<_, RecipeRecord>(&format!(
            "SELECT {} FROM recipes WHERE id = $1",
            RECIPE_COLUMNS
        ))
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Recipe {} not found", recipe_id)))?;
        Ok(record.to_domain())
    }

    async fn update_recipe(&self, recipe_id: Uuid, recipe: &NewRecipe) -> PortResult<Recipe> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let record = sqlx::query_as::<_, RecipeRecord>(
            "UPDATE recipes SET name = $1, image = $2, text = $3, cooking_time = $4 \
             WHERE id = $5 \
             RETURNING id, author_id, name, image, text, cooking_time, created_at",
        )
        .bind(&recipe.name)
        .bind(&recipe.image)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .bind(recipe_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Recipe {} not found", recipe_id)))?;

        // Tag set and ingredient lines are replaced wholesale, no diffing.
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        for tag_id in &recipe.tag_ids {
            sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
                .bind(recipe_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| insert_error(e, "Duplicate tag on recipe"))?;
        }

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        for line in &recipe.ingredients {
            sqlx::query(
                "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) \
                 VALUES ($1, $2, $3)",
            )
            .bind(recipe_id)
            .bind(line.ingredient_id)
            .bind(line.amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| insert_error(e, "An ingredient appears twice in the recipe"))?;
        }

        tx.commit()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn delete_recipe(&self, recipe_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Recipe {} not found",
                recipe_id
            )));
        }
        Ok(())
    }

    async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        limit: i64,
        offset: i64,
    ) -> PortResult<Vec<Recipe>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.created_at \
             FROM recipes r WHERE TRUE",
        );
        push_recipe_filter(&mut builder, filter);
        builder.push(" ORDER BY r.created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let records = builder
            .build_query_as::<RecipeRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn count_recipes(&self, filter: &RecipeFilter) -> PortResult<i64> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM recipes r WHERE TRUE");
        push_recipe_filter(&mut builder, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn recipe_tags(&self, recipe_id: Uuid) -> PortResult<Vec<Tag>> {
        let records = sqlx::query_as::<_, TagRecord>(
            "SELECT t.id, t.name, t.color, t.slug FROM tags t \
             JOIN recipe_tags rt ON rt.tag_id = t.id \
             WHERE rt.recipe_id = $1 ORDER BY t.name",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn recipes_by_author(&self, author_id: Uuid, limit: i64) -> PortResult<Vec<Recipe>> {
        let records = sqlx::query_as::<_, RecipeRecord>(&format!(
            "SELECT {} FROM recipes WHERE author_id = $1 ORDER BY created_at DESC LIMIT $2",
            RECIPE_COLUMNS
        ))
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn count_recipes_by_author(&self, author_id: Uuid) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn is_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = $1 AND recipe_id = $2)",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn add_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()> {
        sqlx::query("INSERT INTO favorites (user_id, recipe_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, "Recipe is already in favorites"))?;
        Ok(())
    }

    async fn remove_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(
                "Recipe is not in favorites".to_string(),
            ));
        }
        Ok(())
    }

    async fn is_in_cart(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM cart_items WHERE user_id = $1 AND recipe_id = $2)",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn add_to_cart(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()> {
        sqlx::query("INSERT INTO cart_items (user_id, recipe_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, "Recipe is already in the shopping cart"))?;
        Ok(())
    }

    async fn remove_from_cart(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(
                "Recipe is not in the shopping cart".to_string(),
            ));
        }
        Ok(())
    }

    async fn is_subscribed(&self, user_id: Uuid, author_id: Uuid) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn subscribe(&self, user_id: Uuid, author_id: Uuid) -> PortResult<()> {
        sqlx::query("INSERT INTO subscriptions (user_id, author_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, "Already subscribed to this author"))?;
        Ok(())
    }

    async fn unsubscribe(&self, user_id: Uuid, author_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(
                "Not subscribed to this author".to_string(),
            ));
        }
        Ok(())
    }

    async fn list_subscriptions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(
            "SELECT u.id, u.username, u.first_name, u.last_name, u.email FROM users u \
             JOIN subscriptions s ON s.author_id = u.id \
             WHERE s.user_id = $1 ORDER BY s.created_at ASC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn count_subscriptions(&self, user_id: Uuid) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

//=========================================================================================
// `CartSource` Trait Implementation
//=========================================================================================

#[async_trait]
impl CartSource for DbAdapter {
    async fn cart_recipe_ids(&self, user_id: Uuid) -> PortResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT recipe_id FROM cart_items WHERE user_id = $1 ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn ingredient_lines(&self, recipe_id: Uuid) -> PortResult<Vec<IngredientLine>> {
        // An absent recipe is a hard failure, distinct from a recipe that
        // simply has no lines.
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM recipes WHERE id = $1)",
        )
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if !exists {
            return Err(PortError::NotFound(format!(
                "Recipe {} not found",
                recipe_id
            )));
        }

        let records = sqlx::query_as::<_, LineRecord>(
            "SELECT ri.ingredient_id, i.name, i.measurement_unit, ri.amount \
             FROM recipe_ingredients ri \
             JOIN ingredients i ON i.id = ri.ingredient_id \
             WHERE ri.recipe_id = $1 ORDER BY ri.id ASC",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
