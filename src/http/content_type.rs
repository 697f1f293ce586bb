use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub(super) const JSON_LD: &str = "application/ld+json";

pub(super) struct JsonLd<T>(pub(super) T);

impl<T> IntoResponse for JsonLd<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let mut response = Json(self.0).into_response();
        if response.status() != StatusCode::INTERNAL_SERVER_ERROR {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_LD));
        }
        response
    }
}
