//! Author routes.
//!
//! - GET /authors, POST /authors
//! - GET /authors/{id}, PUT /authors/{id}, DELETE /authors/{id}
//! - GET /authors/{id}/books - Books attributed to the author
//! - POST /authors/{id}/books - Attribute a book given in the body
//! - POST /authors/{id}/books/{isbn} - Attribute an existing book
//! - DELETE /authors/{id}/books/{isbn} - Detach a book if the author owns it
//!
//! Every route under `/authors/{id}` answers 404 when the author is unknown.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use bookshelf_core::{Author, AuthorId, Book, Isbn};
use serde::Serialize;

use crate::error::ApiResult;
use crate::extract::{AuthorBody, ValidatedJson};
use crate::routes::books::{BookResponse, BooksResponse};
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// `{ "authors": [...] }`
#[derive(Debug, Serialize)]
pub struct AuthorsResponse {
    pub authors: Vec<Author>,
}

/// `{ "author": {...} }`
#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub author: Author,
}

/// Response for DELETE /authors/{id}/books/{isbn}.
///
/// `book` is false when the book was not attributed to this author.
#[derive(Debug, Serialize)]
pub struct DetachBookResponse {
    pub book: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /authors
async fn list_authors(State(state): State<AppState>) -> ApiResult<Json<AuthorsResponse>> {
    let authors = state.store().authors().find_all().await?;
    Ok(Json(AuthorsResponse { authors }))
}

/// GET /authors/{id}
async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<AuthorId>,
) -> ApiResult<Json<AuthorResponse>> {
    let author = state.store().authors().find_one(id).await?;
    Ok(Json(AuthorResponse { author }))
}

/// POST /authors - 201 with the generated id.
async fn create_author(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<AuthorBody>,
) -> ApiResult<(StatusCode, Json<AuthorResponse>)> {
    let mut author = Author::new(body.name);
    state.store().authors().save(&mut author).await?;

    Ok((StatusCode::CREATED, Json(AuthorResponse { author })))
}

/// PUT /authors/{id} - Rename.
async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<AuthorId>,
    ValidatedJson(body): ValidatedJson<AuthorBody>,
) -> ApiResult<Json<AuthorResponse>> {
    let mut author = Author::with_id(id, body.name);
    state.store().authors().save(&mut author).await?;

    Ok(Json(AuthorResponse { author }))
}

/// DELETE /authors/{id} - 409 while books are still attributed to it.
async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<AuthorId>,
) -> ApiResult<Json<AuthorResponse>> {
    let author = state.store().authors().remove(id).await?;
    Ok(Json(AuthorResponse { author }))
}

/// GET /authors/{id}/books
async fn author_books(
    State(state): State<AppState>,
    Path(id): Path<AuthorId>,
) -> ApiResult<Json<BooksResponse>> {
    let authors = state.store().authors();
    authors.find_one(id).await?;

    let books = authors.books(id).await?;
    Ok(Json(BooksResponse { books }))
}

/// POST /authors/{id}/books - Insert the book, or reassign it if the isbn exists.
async fn add_book(
    State(state): State<AppState>,
    Path(id): Path<AuthorId>,
    ValidatedJson(book): ValidatedJson<Book>,
) -> ApiResult<Json<BookResponse>> {
    let authors = state.store().authors();
    authors.find_one(id).await?;

    let book = authors.add_book(id, &book).await?;
    Ok(Json(BookResponse { book }))
}

/// POST /authors/{id}/books/{isbn} - Reassign an existing book.
async fn attach_book(
    State(state): State<AppState>,
    Path((id, isbn)): Path<(AuthorId, Isbn)>,
) -> ApiResult<Json<BookResponse>> {
    let authors = state.store().authors();
    authors.find_one(id).await?;

    let book = authors.attach(id, &isbn).await?;
    Ok(Json(BookResponse { book }))
}

/// DELETE /authors/{id}/books/{isbn}
async fn detach_book(
    State(state): State<AppState>,
    Path((id, isbn)): Path<(AuthorId, Isbn)>,
) -> ApiResult<Json<DetachBookResponse>> {
    let authors = state.store().authors();
    authors.find_one(id).await?;

    let book = authors.remove_book(id, Some(&isbn)).await?;
    Ok(Json(DetachBookResponse { book }))
}

/// Build author routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/authors", get(list_authors).post(create_author))
        .route(
            "/authors/{id}",
            get(get_author).put(update_author).delete(delete_author),
        )
        .route("/authors/{id}/books", get(author_books).post(add_book))
        .route(
            "/authors/{id}/books/{isbn}",
            post(attach_book).delete(detach_book),
        )
}
