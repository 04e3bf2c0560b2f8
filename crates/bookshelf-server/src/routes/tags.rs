//! Tag routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use bookshelf_core::{Tag, TagId};
use serde::Serialize;

use crate::error::ApiResult;
use crate::routes::books::BooksResponse;
use crate::state::AppState;

/// `{ "tags": [...] }`
#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<Tag>,
}

/// `{ "tag": {...} }`
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub tag: Tag,
}

/// GET /tags - All tags ordered by name.
async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<TagsResponse>> {
    let tags = state.store().tags().find_all().await?;
    Ok(Json(TagsResponse { tags }))
}

/// GET /tags/{id}/books
async fn tag_books(
    State(state): State<AppState>,
    Path(id): Path<TagId>,
) -> ApiResult<Json<BooksResponse>> {
    let tags = state.store().tags();
    tags.find_one(id).await?;

    let books = tags.books(id).await?;
    Ok(Json(BooksResponse { books }))
}

/// DELETE /tags/{id} - Unlinks the tag from every book.
async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<TagId>,
) -> ApiResult<Json<TagResponse>> {
    let tag = state.store().tags().remove(id).await?;
    Ok(Json(TagResponse { tag }))
}

/// Build tag routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags))
        .route("/tags/{id}", delete(delete_tag))
        .route("/tags/{id}/books", get(tag_books))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tags_response_serialization() {
        let response = TagsResponse {
            tags: vec![Tag::with_id(TagId(3), "fiction")],
        };
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"tags": [{"id": 3, "name": "fiction"}]})
        );
    }
}
