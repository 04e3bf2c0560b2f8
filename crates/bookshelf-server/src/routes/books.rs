//! Book routes.
//!
//! - GET /books - List all books
//! - POST /books - Create a book
//! - GET /books/{isbn} - Get one book
//! - PUT /books/{isbn} - Replace every field but the isbn
//! - PATCH /books/{isbn} - Replace only the fields present in the body
//! - DELETE /books/{isbn} - Delete a book
//! - GET /books/{isbn}/tags - Tags linked to a book
//! - POST /books/{isbn}/tags/{tag_name} - Link a tag, creating it if needed

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use bookshelf_core::{Book, BookPatch, BookUpdate, Isbn, Tag};
use bookshelf_store::StoreError;
use serde::Serialize;

use crate::error::ApiResult;
use crate::extract::ValidatedJson;
use crate::routes::tags::TagsResponse;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// `{ "book": {...} }`
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub book: Book,
}

/// `{ "books": [...] }`
#[derive(Debug, Serialize)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}

/// Response for DELETE /books/{isbn}.
#[derive(Debug, Serialize)]
pub struct DeleteBookResponse {
    pub message: &'static str,
}

/// Response for POST /books/{isbn}/tags/{tag_name}.
#[derive(Debug, Serialize)]
pub struct AddTagResponse {
    pub result: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /books - All books ordered by title.
async fn list_books(State(state): State<AppState>) -> ApiResult<Json<BooksResponse>> {
    let books = state.store().books().find_all().await?;
    Ok(Json(BooksResponse { books }))
}

/// GET /books/{isbn}
async fn get_book(
    State(state): State<AppState>,
    Path(isbn): Path<Isbn>,
) -> ApiResult<Json<BookResponse>> {
    let book = state.store().books().find_one(&isbn).await?;
    Ok(Json(BookResponse { book }))
}

/// POST /books - Create a book.
///
/// # Response
///
/// - 201 Created: `{ "book": {...} }`
/// - 400 Bad Request: body fails the book schema, or unknown `author_id`
/// - 409 Conflict: isbn already taken
async fn create_book(
    State(state): State<AppState>,
    ValidatedJson(book): ValidatedJson<Book>,
) -> ApiResult<(StatusCode, Json<BookResponse>)> {
    let book = state.store().books().create(&book).await?;

    tracing::info!(isbn = %book.isbn, title = %book.title, "Book created via API");

    Ok((StatusCode::CREATED, Json(BookResponse { book })))
}

/// PUT /books/{isbn} - Full update. An isbn in the body is ignored.
async fn update_book(
    State(state): State<AppState>,
    Path(isbn): Path<Isbn>,
    ValidatedJson(update): ValidatedJson<BookUpdate>,
) -> ApiResult<Json<BookResponse>> {
    let book = state.store().books().update(&isbn, &update).await?;
    Ok(Json(BookResponse { book }))
}

/// PATCH /books/{isbn} - Partial update. An empty body returns the book unchanged.
async fn patch_book(
    State(state): State<AppState>,
    Path(isbn): Path<Isbn>,
    ValidatedJson(patch): ValidatedJson<BookPatch>,
) -> ApiResult<Json<BookResponse>> {
    let book = state.store().books().partial_update(&isbn, &patch).await?;
    Ok(Json(BookResponse { book }))
}

/// DELETE /books/{isbn}
async fn delete_book(
    State(state): State<AppState>,
    Path(isbn): Path<Isbn>,
) -> ApiResult<Json<DeleteBookResponse>> {
    state.store().books().remove(&isbn).await?;
    Ok(Json(DeleteBookResponse {
        message: "Book deleted",
    }))
}

/// GET /books/{isbn}/tags - 404 when the book does not exist.
async fn book_tags(
    State(state): State<AppState>,
    Path(isbn): Path<Isbn>,
) -> ApiResult<Json<TagsResponse>> {
    let books = state.store().books();
    if !books.exists(&isbn).await? {
        return Err(StoreError::BookNotFound(isbn).into());
    }

    let tags = books.tags(&isbn).await?;
    Ok(Json(TagsResponse { tags }))
}

/// POST /books/{isbn}/tags/{tag_name} - Idempotent.
async fn add_tag(
    State(state): State<AppState>,
    Path((isbn, tag_name)): Path<(Isbn, String)>,
) -> ApiResult<Json<AddTagResponse>> {
    let mut tag = Tag::new(tag_name);
    state.store().books().add_tag(&isbn, &mut tag).await?;

    Ok(Json(AddTagResponse { result: "success" }))
}

/// Build book routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{isbn}",
            get(get_book)
                .put(update_book)
                .patch(patch_book)
                .delete(delete_book),
        )
        .route("/books/{isbn}/tags", get(book_tags))
        .route("/books/{isbn}/tags/{tag_name}", post(add_tag))
}

// ============================================================================
// Tests
// ============================================================================
