//! Request body extraction
//!
//! The wizard's HTML forms post `application/x-www-form-urlencoded`, while
//! scripts tend to post JSON. Both carry the same fields.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::{error_response, ApiError};

/// Deserializes a form-encoded or JSON body, chosen by `Content-Type`
pub struct FormOrJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))?;
            Ok(Self(value))
        }
    }
}
