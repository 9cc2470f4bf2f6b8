//! HTTP routes for the lead service.

use super::config::ServerConfig;
use super::error::ApiError;
use super::payload::Payload;
use super::telemetry::{increment_leads_created, increment_requests, record_request_duration};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, Request, State, rejection::JsonRejection},
    http::{Method, StatusCode, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use leaddesk::{CreateLead, Lead, LeadService, MemoryStore, Page, SearchLeads, UpdateLeadRequest};
use serde::Serialize;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub service: LeadService<MemoryStore>,
}

/// Body of a successful update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub result: bool,
    pub msg: String,
}

impl Ack {
    fn new(msg: impl Into<String>) -> Json<Self> {
        Json(Self {
            result: true,
            msg: msg.into(),
        })
    }
}

/// Builds the application router: lead routes under `config.route_prefix`,
/// `/health` at the root, and the middleware stack.
pub fn router(config: &ServerConfig, service: LeadService<MemoryStore>) -> Router {
    let leads = Router::new()
        .route("/lead", post(create_lead).get(list_leads))
        .route("/lead/search", post(search_leads))
        .route(
            "/lead/{id}",
            get(get_lead).patch(update_lead).delete(delete_lead),
        );

    let router = if config.route_prefix.is_empty() {
        Router::new().merge(leads)
    } else {
        Router::new().nest(&config.route_prefix, leads)
    };

    router
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(CompressionLayer::new())
        .layer(cors(config))
        .layer(middleware::from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

fn cors(config: &ServerConfig) -> CorsLayer {
    let methods = [
        Method::POST,
        Method::PUT,
        Method::GET,
        Method::OPTIONS,
        Method::HEAD,
        Method::DELETE,
        Method::PATCH,
    ];

    match &config.cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.clone())
            .allow_credentials(true)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any),
    }
}

async fn track_metrics(request: Request, next: Next) -> Response {
    increment_requests();
    let start = Instant::now();
    let response = next.run(request).await;
    record_request_duration(start.elapsed().as_secs_f64() * 1000.0);
    response
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_lead(
    State(state): State<AppState>,
    Payload(request): Payload<CreateLead>,
) -> Result<(StatusCode, Json<Lead>), ApiError> {
    let lead = state.service.create(request).await?;
    increment_leads_created();
    Ok((StatusCode::CREATED, Json(lead)))
}

async fn list_leads(State(state): State<AppState>) -> Result<Json<Vec<Lead>>, ApiError> {
    Ok(Json(state.service.list().await?))
}

async fn get_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Lead>, ApiError> {
    Ok(Json(state.service.get_by_id(&id).await?))
}

async fn search_leads(
    State(state): State<AppState>,
    Payload(request): Payload<SearchLeads>,
) -> Result<Json<Page<Lead>>, ApiError> {
    Ok(Json(state.service.search(request).await?))
}

async fn update_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateLeadRequest>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let Json(request) = payload?;
    let outcome = state.service.update_by_id(&id, request.update_obj).await?;

    Ok(match (outcome.matched, outcome.modified) {
        (false, _) => Ack::new(format!("No lead with id {id}; nothing was updated")),
        (true, false) => Ack::new(format!("Lead {id} already up to date")),
        (true, true) => Ack::new(format!("Lead {id} updated")),
    })
}

async fn delete_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, ApiError> {
    Ok(if state.service.delete_by_id(&id).await? {
        Ack::new(format!("Lead {id} deleted"))
    } else {
        Ack::new(format!("No lead with id {id}; nothing was deleted"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn config() -> ServerConfig {
        ServerConfig {
            server_addr: "127.0.0.1:0".parse().unwrap(),
            route_prefix: "/dashboard/v1".into(),
            cors_origin: None,
            data_file: None,
            body_limit_bytes: 1024,
        }
    }

    fn app() -> Router {
        router(&config(), LeadService::new(Arc::new(MemoryStore::new())))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = axum::http::Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn ada() -> Value {
        json!({
            "name": "Ada",
            "email": "ada@example.com",
            "status": "qualified",
            "estimatedSaleAmount": "1000"
        })
    }

    #[tokio::test]
    async fn create_returns_201_and_the_lead() {
        let app = app();
        let (status, body) = send(&app, "POST", "/dashboard/v1/lead", Some(ada())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 1);
        assert_eq!(body["estimatedSaleAmount"], 1000);
        assert_eq!(body["estimatedCommission"], 50);
    }

    #[tokio::test]
    async fn validation_errors_are_400_with_a_code() {
        let app = app();
        let mut lead = ada();
        lead["email"] = json!("not-an-email");

        let (status, body) = send(&app, "POST", "/dashboard/v1/lead", Some(lead)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["result"], false);
        assert_eq!(body["code"], "INVALID_EMAIL");

        let (_, leads) = send(&app, "GET", "/dashboard/v1/lead", None).await;
        assert_eq!(leads, json!([]));
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let app = app();
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/dashboard/v1/lead")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_maps_missing_and_invalid_ids() {
        let app = app();
        send(&app, "POST", "/dashboard/v1/lead", Some(ada())).await;

        let (status, body) = send(&app, "GET", "/dashboard/v1/lead/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ada");

        let (status, body) = send(&app, "GET", "/dashboard/v1/lead/2", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, body) = send(&app, "GET", "/dashboard/v1/lead/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ID");
    }

    #[tokio::test]
    async fn patch_recomputes_commission() {
        let app = app();
        send(&app, "POST", "/dashboard/v1/lead", Some(ada())).await;

        let (status, body) = send(
            &app,
            "PATCH",
            "/dashboard/v1/lead/1",
            Some(json!({ "update_obj": { "status": "unqualified" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], true);

        let (_, lead) = send(&app, "GET", "/dashboard/v1/lead/1", None).await;
        assert_eq!(lead["status"], "unqualified");
        assert_eq!(lead["estimatedCommission"], 0);
    }

    #[tokio::test]
    async fn patch_rejects_owned_fields_and_missing_bodies() {
        let app = app();
        send(&app, "POST", "/dashboard/v1/lead", Some(ada())).await;

        let (status, _) = send(
            &app,
            "PATCH",
            "/dashboard/v1/lead/1",
            Some(json!({ "update_obj": { "estimatedCommission": 999 } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, "PATCH", "/dashboard/v1/lead/1", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn search_pages_newest_first() {
        let app = app();
        for _ in 0..5 {
            send(&app, "POST", "/dashboard/v1/lead", Some(ada())).await;
        }

        let (status, body) = send(
            &app,
            "POST",
            "/dashboard/v1/lead/search",
            Some(json!({ "chunkIndex": 0, "limit": 2, "sortCode": "1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 5);
        assert_eq!(body["data"][0]["id"], 5);
        assert_eq!(body["data"][1]["id"], 4);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let app = app();
        send(&app, "POST", "/dashboard/v1/lead", Some(ada())).await;

        let (status, body) = send(&app, "DELETE", "/dashboard/v1/lead/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], true);

        let (status, body) = send(&app, "DELETE", "/dashboard/v1/lead/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], true);
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let app = app();
        let mut lead = ada();
        lead["name"] = json!("x".repeat(4096));

        let (status, _) = send(&app, "POST", "/dashboard/v1/lead", Some(lead)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    async fn send_form(app: &Router, uri: &str, body: &'static str) -> (StatusCode, Value) {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn create_and_search_accept_form_bodies() {
        let app = app();
        let (status, lead) = send_form(
            &app,
            "/dashboard/v1/lead",
            "name=Ada&email=ada%40example.com&status=qualified&estimatedSaleAmount=1000",
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(lead["email"], "ada@example.com");
        assert_eq!(lead["estimatedSaleAmount"], 1000);
        assert_eq!(lead["estimatedCommission"], 50);

        let (status, page) = send_form(
            &app,
            "/dashboard/v1/lead/search",
            "chunkIndex=0&limit=5&sortCode=1",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["count"], 1);
        assert_eq!(page["data"][0]["name"], "Ada");
    }

    #[tokio::test]
    async fn form_bodies_are_validated_like_json() {
        let app = app();
        let (status, body) = send_form(
            &app,
            "/dashboard/v1/lead",
            "name=Ada&email=nope&status=qualified&estimatedSaleAmount=1000",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_EMAIL");

        let (status, body) = send_form(&app, "/dashboard/v1/lead", "name=Ada&email=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn health_lives_outside_the_prefix() {
        let app = app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
