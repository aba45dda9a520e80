//! services/api/src/web/tags.rs
//!
//! Read-only tag endpoints. Tags are reference data, so there is no
//! pagination and no write surface.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use cookbook_core::domain::Tag;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::port_error;
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct TagPayload {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl TagPayload {
    pub fn from_domain(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        }
    }
}

/// GET /api/tags - List all tags
#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "All tags", body = [TagPayload]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_tags_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let tags = state
        .store
        .list_tags()
        .await
        .map_err(|e| port_error("Failed to list tags", e))?;
    let payload: Vec<TagPayload> = tags.into_iter().map(TagPayload::from_domain).collect();
    Ok(Json(payload))
}

/// GET /api/tags/{id} - Retrieve one tag
#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag id")),
    responses(
        (status = 200, description = "The tag", body = TagPayload),
        (status = 404, description = "Tag not found")
    )
)]
pub async fn get_tag_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let tag = state
        .store
        .get_tag(id)
        .await
        .map_err(|e| port_error("Failed to get tag", e))?;
    Ok(Json(TagPayload::from_domain(tag)))
}
