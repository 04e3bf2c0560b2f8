//! Schema-validated JSON body extraction.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use bookshelf_core::{
    AUTHOR_SCHEMA, BOOK_PATCH_SCHEMA, BOOK_SCHEMA, BOOK_UPDATE_SCHEMA, Book, BookPatch, BookUpdate,
    Schema,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// A request body type with a schema it must satisfy.
pub trait BodySchema {
    fn schema() -> &'static Schema;
}

impl BodySchema for Book {
    fn schema() -> &'static Schema {
        &BOOK_SCHEMA
    }
}

impl BodySchema for BookUpdate {
    fn schema() -> &'static Schema {
        &BOOK_UPDATE_SCHEMA
    }
}

impl BodySchema for BookPatch {
    fn schema() -> &'static Schema {
        &BOOK_PATCH_SCHEMA
    }
}

/// Body of `POST /authors` and `PUT /authors/{id}`.
#[derive(Debug, Deserialize)]
pub struct AuthorBody {
    pub name: String,
}

impl BodySchema for AuthorBody {
    fn schema() -> &'static Schema {
        &AUTHOR_SCHEMA
    }
}

/// JSON body checked against `T::schema()` with the state's validator
/// before it is deserialized into `T`.
///
/// A schema violation is rejected with `ApiError::Validation`; malformed
/// JSON with `ApiError::BadRequest`.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest<AppState> for ValidatedJson<T>
where
    T: BodySchema + DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        let schema = T::schema();
        let report = state.validator().validate(&body, schema);
        if !report.valid {
            tracing::debug!(
                schema = schema.name,
                violations = report.errors.len(),
                "Request body rejected"
            );
            return Err(ApiError::Validation(report));
        }

        serde_json::from_value(body)
            .map(ValidatedJson)
            .map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schemas_match_body_types() {
        assert_eq!(Book::schema().name, "book");
        assert_eq!(BookUpdate::schema().name, "book_update");
        assert_eq!(BookPatch::schema().name, "book_patch");
        assert_eq!(AuthorBody::schema().name, "author");
    }

    #[test]
    fn test_author_body_ignores_extra_fields() {
        let body: AuthorBody =
            serde_json::from_value(json!({"name": "Jane Austen", "id": 7})).unwrap();
        assert_eq!(body.name, "Jane Austen");
    }
}
