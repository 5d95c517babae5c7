//! HTTP server exposing the blog store through the transformers.
//!
//! # API Endpoints
//!
//! | Method | Path                     | Description                              |
//! |--------|--------------------------|------------------------------------------|
//! | GET    | `/health`                | Health check                             |
//! | GET    | `/api/strategies`        | Registered strategies per entity type    |
//! | GET    | `/api/{collection}`      | Paginated, transformed collection        |
//! | GET    | `/api/{collection}/{id}` | One transformed entity                   |
//! | GET    | `/api/logs`              | SSE stream of request logs               |
//!
//! Resource endpoints accept `include`, `strategy`, `page`, `perPage` and
//! `strict` query parameters.

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tracing::debug;

use super::logs::{log_info, LogEntry, LOG_BROADCASTER};
use super::types::{
    error_response, new_request_id, ResourceResponse, ResponseMeta, StrategyListing, TransformQuery,
};
use crate::blog::{Collection, Store};
use crate::config::Config;
use crate::entity::PageMeta;
use crate::error::{ServerError, ServerResult, StoreError, TransformError};
use crate::registry::{Locator, StrategyRegistry};
use crate::transform::{Shape, Transformer};

/// Shared, read-only state of every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: &'static StrategyRegistry,
    pub store: Arc<Store>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(registry: &'static StrategyRegistry, store: Arc<Store>, config: Config) -> Self {
        Self {
            registry,
            store,
            config: Arc::new(config),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/strategies", get(list_strategies))
        .route("/api/logs", get(sse_logs))
        .route("/api/{collection}", get(list_resources))
        .route("/api/{collection}/{id}", get(show_resource))
        .with_state(state)
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(state: AppState) -> ServerResult<()> {
    let port = state.config.port;
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    log_info(format!("transformers server running on http://localhost:{}", port));
    log_info("GET /api/{collection}[/{id}]?include=&strategy=&page=&perPage=&strict=");
    log_info("GET /api/strategies, GET /api/logs (SSE), GET /health");

    axum::serve(listener, app).await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "transformers",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "collection": "GET /api/{collection}",
            "resource": "GET /api/{collection}/{id}",
            "strategies": "GET /api/strategies",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn list_strategies(State(state): State<AppState>) -> Json<Vec<StrategyListing>> {
    let listings = state
        .registry
        .entity_types()
        .into_iter()
        .filter_map(|entity_type| {
            let strategies = state.registry.locate(entity_type).ok()?;
            Some(StrategyListing {
                entity_type: entity_type.to_string(),
                default: strategies.default_key().to_string(),
                strategies: strategies.keys().into_iter().map(String::from).collect(),
            })
        })
        .collect();
    Json(listings)
}

async fn list_resources(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(query): Query<TransformQuery>,
) -> Result<Json<ResourceResponse>, ServerError> {
    let request_id = new_request_id();
    let route = format!("GET /api/{}", collection);

    let result = render_page(&state, &collection, &query, &request_id);
    finish(&request_id, &route, result)
}

async fn show_resource(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, u64)>,
    Query(query): Query<TransformQuery>,
) -> Result<Json<ResourceResponse>, ServerError> {
    let request_id = new_request_id();
    let route = format!("GET /api/{}/{}", collection, id);

    let result = render_one(&state, &collection, id, &query, &request_id);
    finish(&request_id, &route, result)
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        // Lagged receivers skip what they missed
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

// =============================================================================
// Helpers
// =============================================================================

fn render_page(
    state: &AppState,
    collection: &str,
    query: &TransformQuery,
    request_id: &str,
) -> ServerResult<ResourceResponse> {
    let collection: Collection = collection.parse()?;
    let (page, per_page) = query.window(&state.config);
    let page = state.store.paginate(collection, page, per_page);
    let pagination = page.meta();
    render(state, collection, query, page.into(), Some(pagination), request_id)
}

fn render_one(
    state: &AppState,
    collection: &str,
    id: u64,
    query: &TransformQuery,
    request_id: &str,
) -> ServerResult<ResourceResponse> {
    let collection: Collection = collection.parse()?;
    let entity = state.store.find(collection, id)?;
    render(state, collection, query, entity.into(), None, request_id)
}

fn render(
    state: &AppState,
    collection: Collection,
    query: &TransformQuery,
    shape: Shape,
    pagination: Option<PageMeta>,
    request_id: &str,
) -> ServerResult<ResourceResponse> {
    let mut transformer = Transformer::new(state.registry, collection.entity_type())?
        .with_tree(&query.inclusions())
        .strict_inclusions(query.strict);
    if let Some(key) = query.strategy.as_deref().filter(|key| !key.trim().is_empty()) {
        transformer = transformer.set_transformation(key.trim())?;
    }

    debug!(request_id, %collection, include = %transformer.inclusions(), "rendering");
    let data = transformer.transform_shape(&shape)?;

    Ok(ResourceResponse::new(
        request_id,
        data,
        ResponseMeta {
            entity_type: collection.entity_type().to_string(),
            strategy: transformer.strategy_name().unwrap_or_default().to_string(),
            include: transformer.inclusions().paths(),
            pagination,
        },
    ))
}

/// Log the outcome of a request and wrap the body.
fn finish(
    request_id: &str,
    route: &str,
    result: ServerResult<ResourceResponse>,
) -> Result<Json<ResourceResponse>, ServerError> {
    let entry = match &result {
        Ok(_) => LogEntry::success(format!("{} -> 200", route)),
        Err(err) => {
            let status = err.status_code();
            let message = format!("{} -> {}: {}", route, status.as_u16(), err);
            if status.is_server_error() {
                LogEntry::error(message)
            } else {
                LogEntry::warning(message)
            }
        }
    };
    LOG_BROADCASTER.log(entry.with_request_id(request_id));
    result.map(Json)
}

impl ServerError {
    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_)
            | ServerError::Transform(TransformError::UnknownStrategy { .. })
            | ServerError::Transform(TransformError::UnknownInclusion { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Store(StoreError::NotFound { .. })
            | ServerError::Store(StoreError::UnknownCollection(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(error_response(&self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::{fixtures, strategies};
    use crate::entity::EntityType;
    use crate::error::ResolutionError;

    fn state() -> AppState {
        let registry: &'static StrategyRegistry = Box::leak(Box::new(strategies::registry()));
        AppState::new(registry, fixtures::store(), Config::default())
    }

    fn query(include: &str) -> TransformQuery {
        TransformQuery {
            include: Some(include.to_string()),
            ..TransformQuery::default()
        }
    }

    #[tokio::test]
    async fn test_show_with_nested_include() {
        let Json(response) = show_resource(
            State(state()),
            Path(("users".to_string(), 1)),
            Query(query("posts.tags,isOfAge")),
        )
        .await
        .unwrap();

        assert_eq!(response.data["name"], "Ada");
        assert_eq!(response.data["isOfAge"], true);
        assert_eq!(response.data["posts"].as_array().unwrap().len(), 3);
        assert_eq!(response.data["posts"][0]["tags"].as_array().unwrap().len(), 4);
        assert_eq!(response.meta.entity_type, "user");
        assert_eq!(response.meta.strategy, "default");
        assert_eq!(response.meta.include, vec!["posts.tags", "isOfAge"]);
        assert!(response.meta.pagination.is_none());
    }

    #[tokio::test]
    async fn test_list_is_paginated() {
        let state = AppState::new(
            Box::leak(Box::new(strategies::registry())),
            fixtures::users(15),
            Config::default(),
        );
        let Json(response) = list_resources(
            State(state),
            Path("users".to_string()),
            Query(TransformQuery {
                page: Some(2),
                per_page: Some(5),
                ..TransformQuery::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.data.as_array().unwrap().len(), 5);
        let pagination = response.meta.pagination.unwrap();
        assert_eq!(pagination.current_page, 2);
        assert_eq!(pagination.total, 15);
        assert_eq!(pagination.last_page, 3);
    }

    #[tokio::test]
    async fn test_named_strategy() {
        let Json(response) = show_resource(
            State(state()),
            Path(("users".to_string(), 1)),
            Query(TransformQuery {
                strategy: Some("admin".to_string()),
                ..TransformQuery::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.data["isAdmin"], true);
        assert_eq!(response.meta.strategy, "admin");
    }

    #[tokio::test]
    async fn test_unknown_strategy_is_bad_request() {
        let err = list_resources(
            State(state()),
            Path("users".to_string()),
            Query(TransformQuery {
                strategy: Some("public".to_string()),
                ..TransformQuery::default()
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_strict_unknown_include_is_bad_request() {
        let mut strict = query("comments");
        strict.strict = true;
        let err = show_resource(State(state()), Path(("posts".to_string(), 1)), Query(strict))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let Json(soft) = show_resource(
            State(state()),
            Path(("posts".to_string(), 1)),
            Query(query("comments")),
        )
        .await
        .unwrap();
        assert!(soft.data["comments"].is_null());
    }

    #[tokio::test]
    async fn test_missing_resources_are_not_found() {
        let err = show_resource(
            State(state()),
            Path(("posts".to_string(), 42)),
            Query(TransformQuery::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = list_resources(
            State(state()),
            Path("comments".to_string()),
            Query(TransformQuery::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_error_body() {
        let err = ServerError::from(TransformError::Resolution(ResolutionError::Unregistered(
            EntityType::new("comment"),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().contains("comment"));
    }

    #[tokio::test]
    async fn test_strategy_listing() {
        let Json(listings) = list_strategies(State(state())).await;
        let user = listings.iter().find(|l| l.entity_type == "user").unwrap();
        assert_eq!(user.default, "default");
        assert_eq!(user.strategies, vec!["admin", "default"]);
        assert_eq!(listings.len(), 3);
    }
}
