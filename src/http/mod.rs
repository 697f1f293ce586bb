mod auth;
mod content_type;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::spawn_blocking;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::api::{
    Adapter, AdapterManager, ApiError, ApiRouter, ApiServices, ResourceId, SearchQuery,
};
use crate::config::ApiKey;

use self::auth::api_key_auth;
use self::content_type::JsonLd;

#[derive(Clone)]
pub(crate) struct AppState {
    adapters: Arc<AdapterManager>,
    router: Arc<ApiRouter>,
}

impl AppState {
    pub(crate) fn new(adapters: AdapterManager, router: ApiRouter) -> AppState {
        AppState {
            adapters: Arc::new(adapters),
            router: Arc::new(router),
        }
    }
    fn services(&self) -> ApiServices<'_> {
        ApiServices::new(self.router.as_ref(), &self.adapters)
    }
}

pub(crate) fn app(state: AppState, api_key: Option<ApiKey>) -> Router {
    let create = post(create_resource).route_layer(middleware::from_fn(api_key_auth));
    Router::new()
        .route("/api/{resource}", get(search_resources).merge(create))
        .route("/api/{resource}/{id}", get(read_resource))
        .layer(Extension(api_key))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub(crate) async fn serve(
    http_port: u16,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = TcpListener::bind(format!("0.0.0.0:{http_port}")).await?;
    info!(target: "http", addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn search_resources(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<JsonLd<Vec<Value>>, ApiFailure> {
    let Query(query) = query.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let found = with_adapter(state, resource, move |adapter, services| {
        adapter.search(&query, services)
    })
    .await?;
    Ok(JsonLd(found))
}

async fn read_resource(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<JsonLd<Value>, ApiFailure> {
    let resource_id = ResourceId::parse(&id);
    let found = with_adapter(state, resource.clone(), move |adapter, services| {
        adapter.read(&resource_id, services)
    })
    .await?;
    match found {
        Some(representation) => Ok(JsonLd(representation)),
        None => Err(ApiError::NotFound { resource, id }.into()),
    }
}

async fn create_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Json(request): Json<Value>,
) -> Result<(StatusCode, JsonLd<Value>), ApiFailure> {
    let representation = with_adapter(state, resource, move |adapter, services| {
        adapter.create(&request, services)
    })
    .await?;
    Ok((StatusCode::CREATED, JsonLd(representation)))
}

/// Run `f` against the adapter named `resource` on the blocking pool.
async fn with_adapter<T, F>(state: AppState, resource: String, f: F) -> Result<T, ApiFailure>
where
    T: Send + 'static,
    F: FnOnce(&dyn Adapter, &ApiServices<'_>) -> Result<T> + Send + 'static,
{
    let outcome = spawn_blocking(move || -> Result<T> {
        let services = state.services();
        let adapter = adapter(&services, &resource)?;
        f(adapter, &services)
    })
    .await?;
    Ok(outcome?)
}

fn adapter<'a>(services: &ApiServices<'a>, resource: &str) -> Result<&'a dyn Adapter, ApiError> {
    services
        .adapters
        .get(resource)
        .ok_or_else(|| ApiError::NotFound {
            resource: "api resource".to_owned(),
            id: resource.to_owned(),
        })
}

/// Error response with an Omeka style `{"errors": {"error": ...}}` body.
struct ApiFailure(anyhow::Error);

impl<E> From<E> for ApiFailure
where
    E: Into<anyhow::Error>,
{
    fn from(error: E) -> Self {
        ApiFailure(error.into())
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<ApiError>() {
            Some(ApiError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Some(ApiError::Validation(_)) => StatusCode::BAD_REQUEST,
            Some(ApiError::NotImplemented { .. }) => StatusCode::METHOD_NOT_ALLOWED,
            Some(ApiError::Lookup(_)) | None => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(target: "http", "request failed: {:#}", self.0);
            "internal server error".to_owned()
        } else {
            format!("{:#}", self.0)
        };
        let body = json!({ "errors": { "error": message } });
        (status, Json(body)).into_response()
    }
}
