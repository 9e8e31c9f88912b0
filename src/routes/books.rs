//! Catalog routes
//!
//! - GET / - list every book
//! - GET /search?q= - case-sensitive substring match on title or author
//! - POST /add - multipart {title, author, file?}
//! - GET /edit/{id} - current record
//! - POST /edit/{id} - multipart {title, author, file?}
//! - GET /delete/{id} - remove the book and release its artifact

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    routing::post,
    Extension, Json, Router,
};
use tracing::info;

use crate::middleware::SessionUser;
use crate::models::{AppState, Artifact, BookListResponse, BookRecord, DeleteResponse, SearchParams};
use crate::types::{AppError, AppResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_books))
        .route("/search", get(search_books))
        .route("/add", post(add_book))
        .route("/edit/{id}", get(get_book).post(edit_book))
        .route("/delete/{id}", get(delete_book))
}

/// Fields of the add/edit form.
struct BookForm {
    title: String,
    author: String,
    artifact: Option<Artifact>,
}

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::InvalidRequest(err.body_text())
}

async fn read_book_form(mut multipart: Multipart) -> AppResult<BookForm> {
    let mut title = String::new();
    let mut author = String::new();
    let mut artifact = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = field.text().await.map_err(bad_multipart)?,
            "author" => author = field.text().await.map_err(bad_multipart)?,
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                // Browsers send an empty part when no file was chosen.
                if !filename.is_empty() {
                    artifact = Some(Artifact { filename, bytes });
                }
            }
            _ => {}
        }
    }

    Ok(BookForm {
        title,
        author,
        artifact,
    })
}

async fn list_books(State(state): State<AppState>) -> AppResult<Json<BookListResponse>> {
    let books = state.assets.list().await?;
    Ok(Json(BookListResponse { books, query: None }))
}

async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<BookListResponse>> {
    let books = state.assets.search(&params.q).await?;
    Ok(Json(BookListResponse {
        books,
        query: Some(params.q),
    }))
}

async fn add_book(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = read_book_form(multipart).await?;
    let book = state
        .assets
        .create(&form.title, &form.author, form.artifact)
        .await?;

    info!(user = %user.0, id = book.id, "Book added");
    Ok((StatusCode::CREATED, Json(book)))
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BookRecord>> {
    Ok(Json(state.assets.get(id).await?))
}

async fn edit_book(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<BookRecord>> {
    let form = read_book_form(multipart).await?;
    let book = state
        .assets
        .update(id, &form.title, &form.author, form.artifact)
        .await?;

    info!(user = %user.0, id, "Book edited");
    Ok(Json(book))
}

async fn delete_book(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeleteResponse>> {
    let deleted = state.assets.delete(id).await?;

    info!(user = %user.0, id, deleted, "Book delete requested");
    Ok(Json(DeleteResponse { id, deleted }))
}
