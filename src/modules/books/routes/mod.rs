use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use libris_db::{Collection, DocumentId};
use libris_http::error::AppError;

use super::models::{Book, BookInput};

/// Shared handle to the books collection.
pub type BookStore = Arc<dyn Collection<Book>>;

/// Build the books router on top of a store handle.
pub fn router(store: BookStore) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_book)
                .put(replace_book)
                .patch(patch_book)
                .delete(delete_book),
        )
        .with_state(store)
}

/// Resolve a path-supplied id to its stored book, or short-circuit with the
/// error the pipeline responds with: 404 for a malformed id, 404 for a
/// missing record, 500 for a store fault. The store is only contacted once
/// the id is well-formed.
async fn resolve_book(store: &BookStore, raw_id: &str) -> Result<(DocumentId, Book), AppError> {
    let id = DocumentId::parse(raw_id).map_err(|_| AppError::not_found("book id is not valid"))?;

    match store.find_by_id(&id).await {
        Ok(Some(book)) => Ok((id, book)),
        Ok(None) => Err(AppError::not_found("book not found")),
        Err(err) => Err(AppError::internal(err)),
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

/// List every book. An empty collection is a distinct success class: 204
/// still carrying an empty array body.
async fn list_books(
    State(store): State<BookStore>,
) -> Result<(StatusCode, Json<Vec<Book>>), AppError> {
    let books = store.find_all().await.map_err(AppError::internal)?;

    if books.is_empty() {
        return Ok((StatusCode::NO_CONTENT, Json(books)));
    }

    Ok((StatusCode::OK, Json(books)))
}

/// Create a book. All five fields must be provided and non-empty before the
/// store is contacted; a store-side rejection is likewise the caller's fault.
async fn create_book(
    State(store): State<BookStore>,
    Json(input): Json<BookInput>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = input.try_into_book().map_err(|missing| {
        AppError::bad_request(format!("missing required fields: {}", missing.join(", ")))
    })?;

    let created = store
        .create(book)
        .await
        .map_err(|err| AppError::bad_request(err.to_string()))?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Fetch the resolved book.
async fn get_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let (_, book) = resolve_book(&store, &id).await?;
    Ok(Json(book))
}

/// Full update. Fields absent from the body keep their stored values.
async fn replace_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
    Json(input): Json<BookInput>,
) -> Result<Json<Book>, AppError> {
    let (_, book) = resolve_book(&store, &id).await?;

    let updated = store
        .save(input.merge_into(book))
        .await
        .map_err(|err| AppError::bad_request(err.to_string()))?;

    Ok(Json(updated))
}

/// Partial update. An empty payload is rejected before any merge or store
/// call; otherwise the semantics match [`replace_book`].
async fn patch_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
    Json(input): Json<BookInput>,
) -> Result<Json<Book>, AppError> {
    let (_, book) = resolve_book(&store, &id).await?;

    if input.is_empty() {
        return Err(AppError::bad_request(
            "at least one field to edit must be provided",
        ));
    }

    let updated = store
        .save(input.merge_into(book))
        .await
        .map_err(|err| AppError::bad_request(err.to_string()))?;

    Ok(Json(updated))
}

/// Remove the resolved book and confirm with its title.
async fn delete_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (id, book) = resolve_book(&store, &id).await?;

    store.delete_by_id(&id).await.map_err(AppError::internal)?;

    Ok(Json(json!({
        "message": format!("book '{}' has been deleted", book.title)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use axum::response::Response;
    use libris_db::{MemoryCollection, StoreError};
    use tower::ServiceExt;

    use crate::modules::books::models::validate_book;

    const UNKNOWN_ID: &str = "64ac0ffee64ac0ffee64ac0f";

    fn test_router() -> Router {
        router(Arc::new(MemoryCollection::with_validator(validate_book)))
    }

    fn dune() -> serde_json::Value {
        json!({
            "title": "Dune",
            "author": "Herbert",
            "genre": "SF",
            "publication_date": "1965-01-01",
            "original_language": "en"
        })
    }

    async fn request(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(payload) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        router.clone().oneshot(request).await.unwrap()
    }

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_dune(router: &Router) -> String {
        let response = request(router, "POST", "/", Some(dune())).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response_json(response).await;
        body["id"].as_str().unwrap().to_string()
    }

    /// Store stand-in for fault paths: every operation fails.
    struct UnavailableStore;

    #[async_trait]
    impl Collection<Book> for UnavailableStore {
        async fn create(&self, _doc: Book) -> Result<Book, StoreError> {
            Err(StoreError::Unavailable("collection offline".to_string()))
        }

        async fn find_by_id(&self, _id: &DocumentId) -> Result<Option<Book>, StoreError> {
            Err(StoreError::Unavailable("collection offline".to_string()))
        }

        async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
            Err(StoreError::Unavailable("collection offline".to_string()))
        }

        async fn save(&self, _doc: Book) -> Result<Book, StoreError> {
            Err(StoreError::Unavailable("collection offline".to_string()))
        }

        async fn delete_by_id(&self, _id: &DocumentId) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("collection offline".to_string()))
        }
    }

    #[tokio::test]
    async fn health_endpoint_reports_ok() {
        let response = request(&test_router(), "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_returns_201_with_a_store_assigned_id() {
        let response = request(&test_router(), "POST", "/", Some(dune())).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response_json(response).await;
        assert_eq!(body["title"], "Dune");
        assert_eq!(body["author"], "Herbert");
        assert_eq!(body["genre"], "SF");
        assert_eq!(body["publication_date"], "1965-01-01");
        assert_eq!(body["original_language"], "en");

        let id = body["id"].as_str().unwrap();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn create_rejects_payloads_missing_any_field() {
        let router = test_router();

        for field in [
            "title",
            "author",
            "genre",
            "publication_date",
            "original_language",
        ] {
            let mut payload = dune();
            payload.as_object_mut().unwrap().remove(field);

            let response = request(&router, "POST", "/", Some(payload)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body = response_json(response).await;
            assert!(body["message"].as_str().unwrap().contains(field));
        }

        // Nothing was persisted by any of the rejected attempts.
        let response = request(&router, "GET", "/", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn create_treats_empty_strings_as_missing() {
        let mut payload = dune();
        payload["title"] = json!("");

        let response = request(&test_router(), "POST", "/", Some(payload)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("title"));
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected_before_the_store_is_contacted() {
        // A store that fails every call: reaching it would turn the 404 into
        // a 500, so passing proves the guard short-circuits first.
        let router = router(Arc::new(UnavailableStore));

        for id in ["abc123", "zzzzzzzzzzzzzzzzzzzzzzzz", "64ac0ffee64ac0ffee64ac0f5"] {
            for (method, body) in [
                ("GET", None),
                ("PUT", Some(json!({"title": "x"}))),
                ("PATCH", Some(json!({"title": "x"}))),
                ("DELETE", None),
            ] {
                let response = request(&router, method, &format!("/{id}"), body).await;
                assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} /{id}");

                let message = response_json(response).await;
                assert_eq!(message["message"], "book id is not valid");
            }
        }
    }

    #[tokio::test]
    async fn well_formed_unknown_ids_are_not_found() {
        let router = test_router();

        for (method, body) in [
            ("GET", None),
            ("PUT", Some(json!({"title": "x"}))),
            ("PATCH", Some(json!({"title": "x"}))),
            ("DELETE", None),
        ] {
            let response = request(&router, method, &format!("/{UNKNOWN_ID}"), body).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method}");

            let message = response_json(response).await;
            assert_eq!(message["message"], "book not found");
        }
    }

    #[tokio::test]
    async fn lookup_faults_map_to_server_errors() {
        let router = router(Arc::new(UnavailableStore));

        let response = request(&router, "GET", &format!("/{UNKNOWN_ID}"), None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = request(&router, "GET", "/", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response_json(response).await;
        assert_eq!(body["message"], "store unavailable: collection offline");
    }

    #[tokio::test]
    async fn list_distinguishes_empty_from_populated() {
        let router = test_router();

        let response = request(&router, "GET", "/", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response_json(response).await, json!([]));

        create_dune(&router).await;

        let response = request(&router, "GET", "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["title"], "Dune");
    }

    #[tokio::test]
    async fn created_books_round_trip_through_fetch() {
        let router = test_router();
        let id = create_dune(&router).await;

        let response = request(&router, "GET", &format!("/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        let mut expected = dune();
        expected["id"] = json!(id);
        assert_eq!(body, expected);
    }

    #[tokio::test]
    async fn replace_falls_back_to_stored_values_for_absent_fields() {
        let router = test_router();
        let id = create_dune(&router).await;

        let response = request(
            &router,
            "PUT",
            &format!("/{id}"),
            Some(json!({"genre": "Science Fiction"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["genre"], "Science Fiction");
        assert_eq!(body["title"], "Dune");
        assert_eq!(body["publication_date"], "1965-01-01");
    }

    #[tokio::test]
    async fn repeated_replace_with_identical_body_is_idempotent() {
        let router = test_router();
        let id = create_dune(&router).await;

        let payload = json!({
            "title": "Dune Messiah",
            "author": "Frank Herbert",
            "genre": "SF",
            "publication_date": "1969-01-01",
            "original_language": "en"
        });

        let first = request(&router, "PUT", &format!("/{id}"), Some(payload.clone())).await;
        assert_eq!(first.status(), StatusCode::OK);
        let first_body = response_json(first).await;

        let second = request(&router, "PUT", &format!("/{id}"), Some(payload)).await;
        assert_eq!(second.status(), StatusCode::OK);
        let second_body = response_json(second).await;

        assert_eq!(first_body, second_body);
        assert_eq!(second_body["title"], "Dune Messiah");
    }

    #[tokio::test]
    async fn patch_merges_provided_fields_into_the_stored_book() {
        let router = test_router();
        let id = create_dune(&router).await;

        let response = request(
            &router,
            "PATCH",
            &format!("/{id}"),
            Some(json!({"genre": "Science Fiction"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["genre"], "Science Fiction");
        assert_eq!(body["title"], "Dune");
        assert_eq!(body["id"], id);
    }

    #[tokio::test]
    async fn empty_patch_is_rejected_and_nothing_changes() {
        let router = test_router();
        let id = create_dune(&router).await;

        for payload in [json!({}), json!({"title": ""})] {
            let response = request(&router, "PATCH", &format!("/{id}"), Some(payload)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body = response_json(response).await;
            assert_eq!(body["message"], "at least one field to edit must be provided");
        }

        let response = request(&router, "GET", &format!("/{id}"), None).await;
        let body = response_json(response).await;
        assert_eq!(body["title"], "Dune");
        assert_eq!(body["genre"], "SF");
    }

    #[tokio::test]
    async fn delete_removes_the_book_and_confirms_with_its_title() {
        let router = test_router();
        let id = create_dune(&router).await;

        let response = request(&router, "DELETE", &format!("/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("Dune"));

        let response = request(&router, "GET", &format!("/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = request(&router, "GET", "/", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
