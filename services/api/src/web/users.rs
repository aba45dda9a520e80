//! services/api/src/web/users.rs
//!
//! User registration, profiles, password changes and author subscriptions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use cookbook_core::domain::User;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::auth::{hash_password, verify_password};
use crate::web::pagination::{Page, PageQuery};
use crate::web::port_error;
use crate::web::recipes::ShortRecipePayload;
use crate::web::state::AppState;

/// How many of an author's recipes ride along in the subscription payload.
const SUBSCRIPTION_RECIPE_PREVIEW: i64 = 3;

const MIN_PASSWORD_LEN: usize = 8;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserPayload {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

/// A user payload extended with the author's recipes, used by the
/// subscription endpoints.
#[derive(Serialize, ToSchema)]
pub struct UserSubPayload {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<ShortRecipePayload>,
    pub recipes_count: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub new_password: String,
    pub current_password: String,
}

//=========================================================================================
// Payload Builders and Validation
//=========================================================================================

fn payload_from(user: User, is_subscribed: bool) -> UserPayload {
    UserPayload {
        email: user.email,
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        is_subscribed,
    }
}

/// Builds a user payload with `is_subscribed` computed relative to the viewer.
pub async fn user_payload(
    state: &AppState,
    viewer: Option<Uuid>,
    user: User,
) -> Result<UserPayload, (StatusCode, String)> {
    let is_subscribed = match viewer {
        Some(viewer_id) if viewer_id != user.id => state
            .store
            .is_subscribed(viewer_id, user.id)
            .await
            .map_err(|e| port_error("Failed to check subscription", e))?,
        _ => false,
    };
    Ok(payload_from(user, is_subscribed))
}

async fn subscription_payload(
    state: &AppState,
    author: User,
) -> Result<UserSubPayload, (StatusCode, String)> {
    let recipes = state
        .store
        .recipes_by_author(author.id, SUBSCRIPTION_RECIPE_PREVIEW)
        .await
        .map_err(|e| port_error("Failed to list author recipes", e))?;
    let recipes_count = state
        .store
        .count_recipes_by_author(author.id)
        .await
        .map_err(|e| port_error("Failed to count author recipes", e))?;

    Ok(UserSubPayload {
        email: author.email,
        id: author.id,
        username: author.username,
        first_name: author.first_name,
        last_name: author.last_name,
        is_subscribed: true,
        recipes: recipes
            .into_iter()
            .map(ShortRecipePayload::from_domain)
            .collect(),
        recipes_count,
    })
}

fn valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn validate_signup(req: &SignupRequest) -> Result<(), String> {
    if !req.email.contains('@') || req.email.is_empty() {
        return Err("A valid email is required".to_string());
    }
    if !valid_username(&req.username) {
        return Err(
            "Username may only contain letters, digits and @/./+/-/_ characters".to_string(),
        );
    }
    if req.first_name.is_empty() || req.last_name.is_empty() {
        return Err("First and last name are required".to_string());
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        ));
    }
    Ok(())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/users - Create a new user account
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserPayload),
        (status = 400, description = "Invalid request or duplicate email/username"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Validate the request
    validate_signup(&req).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    // 2. Hash the password
    let password_hash = hash_password(&req.password)?;

    // 3. Create user in database
    let user = state
        .store
        .create_user(
            &req.email,
            &req.username,
            &req.first_name,
            &req.last_name,
            &password_hash,
        )
        .await
        .map_err(|e| port_error("Failed to create user", e))?;

    Ok((StatusCode::CREATED, Json(payload_from(user, false))))
}

/// GET /api/users - List users
#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "A page of users"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (page, limit, offset) = query.resolve(state.config.default_page_size);

    let users = state
        .store
        .list_users(limit, offset)
        .await
        .map_err(|e| port_error("Failed to list users", e))?;
    let count = state
        .store
        .count_users()
        .await
        .map_err(|e| port_error("Failed to count users", e))?;

    let mut results = Vec::with_capacity(users.len());
    for user in users {
        results.push(user_payload(&state, Some(viewer), user).await?);
    }

    Ok(Json(Page::new(results, count, page, limit)))
}

/// GET /api/users/me - The authenticated user's own profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "The caller's profile", body = UserPayload),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = state
        .store
        .get_user(viewer)
        .await
        .map_err(|e| port_error("Failed to get user", e))?;
    Ok(Json(payload_from(user, false)))
}

/// GET /api/users/{id} - Retrieve another user's profile
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The user's profile", body = UserPayload),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = state
        .store
        .get_user(id)
        .await
        .map_err(|e| port_error("Failed to get user", e))?;
    let payload = user_payload(&state, Some(viewer), user).await?;
    Ok(Json(payload))
}

/// POST /api/users/set_password - Change the caller's password
#[utoipa::path(
    post,
    path = "/api/users/set_password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid current password or weak new password"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn set_password_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Validate the new password
    if req.new_password == req.current_password {
        return Err((
            StatusCode::BAD_REQUEST,
            "New password must differ from the current one".to_string(),
        ));
    }
    if req.new_password.len() < MIN_PASSWORD_LEN {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            ),
        ));
    }

    // 2. Check the current password against the stored hash
    let stored_hash = state
        .store
        .get_password_hash(viewer)
        .await
        .map_err(|e| port_error("Failed to get password hash", e))?;
    if !verify_password(&req.current_password, &stored_hash)? {
        return Err((
            StatusCode::BAD_REQUEST,
            "Current password is incorrect".to_string(),
        ));
    }

    // 3. Store the new hash
    let new_hash = hash_password(&req.new_password)?;
    state
        .store
        .set_password_hash(viewer, &new_hash)
        .await
        .map_err(|e| port_error("Failed to set password", e))?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/{id}/subscribe - Subscribe to an author
#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    params(("id" = Uuid, Path, description = "Author id")),
    responses(
        (status = 200, description = "Subscribed", body = UserSubPayload),
        (status = 400, description = "Already subscribed, or subscribing to oneself"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn subscribe_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let author = state
        .store
        .get_user(id)
        .await
        .map_err(|e| port_error("Failed to get author", e))?;

    if viewer == author.id {
        return Err((
            StatusCode::BAD_REQUEST,
            "Cannot subscribe to yourself".to_string(),
        ));
    }

    state
        .store
        .subscribe(viewer, author.id)
        .await
        .map_err(|e| port_error("Failed to subscribe", e))?;

    let payload = subscription_payload(&state, author).await?;
    Ok(Json(payload))
}

/// DELETE /api/users/{id}/subscribe - Unsubscribe from an author
#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    params(("id" = Uuid, Path, description = "Author id")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Was not subscribed"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn unsubscribe_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let subscribed = state
        .store
        .is_subscribed(viewer, id)
        .await
        .map_err(|e| port_error("Failed to check subscription", e))?;
    if !subscribed {
        return Err((
            StatusCode::BAD_REQUEST,
            "You were not subscribed to this author".to_string(),
        ));
    }

    state
        .store
        .unsubscribe(viewer, id)
        .await
        .map_err(|e| port_error("Failed to unsubscribe", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/subscriptions - The authors the caller is subscribed to
#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "A page of subscribed authors"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_subscriptions_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (page, limit, offset) = query.resolve(state.config.default_page_size);

    let authors = state
        .store
        .list_subscriptions(viewer, limit, offset)
        .await
        .map_err(|e| port_error("Failed to list subscriptions", e))?;
    let count = state
        .store
        .count_subscriptions(viewer)
        .await
        .map_err(|e| port_error("Failed to count subscriptions", e))?;

    let mut results = Vec::with_capacity(authors.len());
    for author in authors {
        results.push(subscription_payload(&state, author).await?);
    }

    Ok(Json(Page::new(results, count, page, limit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SignupRequest {
        SignupRequest {
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Example".to_string(),
            password: "correct-horse".to_string(),
        }
    }

    #[test]
    fn accepts_a_well_formed_signup() {
        assert!(validate_signup(&request()).is_ok());
    }

    #[test]
    fn rejects_short_passwords() {
        let mut req = request();
        req.password = "short".to_string();
        assert!(validate_signup(&req).is_err());
    }

    #[test]
    fn rejects_usernames_with_forbidden_characters() {
        let mut req = request();
        req.username = "alice smith".to_string();
        assert!(validate_signup(&req).is_err());
    }

    #[test]
    fn allows_django_style_username_characters() {
        let mut req = request();
        req.username = "alice.smith+test_1@home".to_string();
        assert!(validate_signup(&req).is_ok());
    }

    #[test]
    fn rejects_missing_names_and_bad_email() {
        let mut req = request();
        req.first_name = String::new();
        assert!(validate_signup(&req).is_err());

        let mut req = request();
        req.email = "not-an-email".to_string();
        assert!(validate_signup(&req).is_err());
    }
}
