use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};

use crate::coordinator::ContentAccess;
use crate::models::AppState;
use crate::types::AppResult;

pub fn router() -> Router<AppState> {
    Router::new().route("/uploads/{name}", get(serve_upload))
}

/// GET /uploads/{name} - stream the blob, or redirect to a signed URL when
/// the store issues them.
async fn serve_upload(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Response> {
    match state.assets.open_content(&name).await? {
        ContentAccess::Redirect(url) => Ok(Redirect::temporary(&url).into_response()),
        ContentAccess::Stream(stream) => {
            let content_type = mime_guess::from_path(&name).first_or_octet_stream();
            Ok((
                [(header::CONTENT_TYPE, content_type.to_string())],
                Body::from_stream(stream),
            )
                .into_response())
        }
    }
}
