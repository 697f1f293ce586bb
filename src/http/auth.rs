use std::str;

use axum::Extension;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64ct::{Base64, Encoding};
use secrecy::ExposeSecret;
use tracing::warn;

use crate::config::ApiKey;

/// Write requests authenticate with HTTP basic credentials
/// `key_identity:key_credential`.
pub(super) async fn api_key_auth(
    Extension(api_key): Extension<Option<ApiKey>>,
    req: Request,
    next: Next,
) -> Response {
    fn need_auth() -> Response {
        let authn = [("www-authenticate", "Basic realm=\"api\"")];
        (StatusCode::UNAUTHORIZED, authn).into_response()
    }
    let Some(api_key) = api_key else {
        warn!(target: "http", "write request rejected, no api key configured");
        return StatusCode::FORBIDDEN.into_response();
    };
    let Some(authz) = req.headers().get("authorization") else {
        return need_auth();
    };

    let Ok(cred) = authz.to_str() else {
        return need_auth();
    };
    let Some(cred) = cred
        .strip_prefix("Basic ")
        .map(str::trim)
        .and_then(|b64| Base64::decode_vec(b64).ok())
        .and_then(|b| String::from_utf8(b).ok())
    else {
        return need_auth();
    };

    let Some((identity, credential)) = cred.split_once(':') else {
        return need_auth();
    };

    if identity != api_key.identity || credential != api_key.credential.expose_secret() {
        warn!(target: "http", identity, "write request with invalid api key");
        return need_auth();
    }

    next.run(req).await
}
