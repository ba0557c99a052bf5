/// JSON body extractor with API-shaped rejections
///
/// Reads the body itself instead of going through `axum::Json`, so that a
/// request without a JSON body still reaches the handler. A missing body, an
/// empty one, or one sent without a JSON content type decodes as `{}` and the
/// per-field validators report the required fields. Only JSON that does not
/// parse is a 400; JSON that parses but does not fit the expected shape is a
/// 422.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap},
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::ApiError;
use tasklist_shared::validation::FieldErrors;

const EMPTY_OBJECT: &[u8] = b"{}";

/// JSON request body whose rejection is an [`ApiError`]
#[derive(Debug)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json_content = has_json_content_type(req.headers());
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        let body = if json_content && !is_blank(&bytes) {
            &bytes[..]
        } else {
            EMPTY_OBJECT
        };

        decode(body).map(AppJson)
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| match err.classify() {
        Category::Data => ApiError::ValidationError(FieldErrors::single(
            "body",
            format!("Failed to deserialize the JSON body: {}", err),
        )),
        Category::Io | Category::Syntax | Category::Eof => {
            ApiError::BadRequest(format!("Failed to parse the request body as JSON: {}", err))
        }
    })
}
