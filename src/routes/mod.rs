//! Router assembly: HTTP endpoints, static survey front end, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - REST-ish API under `/api/v1/...`
/// - Static survey front end from `./static` with index fallback
/// - CORS (allow any origin/method/headers); tighten for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/session", post(http::http_create_session))
        .route("/api/v1/session/:id/survey", get(http::http_get_survey))
        .route("/api/v1/session/:id/language", post(http::http_post_language))
        .route("/api/v1/session/:id/complete", post(http::http_post_complete))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{EN, ZH};
    use crate::state::testing::{state_with, RecordingSink};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn answers_for(survey: &Value) -> Value {
        let mut answers = serde_json::Map::new();
        for page in survey["pages"].as_array().unwrap() {
            for el in page["elements"].as_array().unwrap() {
                if el["isRequired"] == true {
                    answers.insert(el["name"].as_str().unwrap().to_string(), json!("x"));
                }
            }
        }
        Value::Object(answers)
    }

    #[tokio::test]
    async fn health() {
        let app = build_router(Arc::new(state_with(Arc::new(RecordingSink::default()))));
        let (status, body) = call(&app, "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn toggle_rebuilds_in_english_with_the_same_images() {
        let app = build_router(Arc::new(state_with(Arc::new(RecordingSink::default()))));
        let (status, created) = call(&app, "POST", "/api/v1/session", Some(json!({ "clientId": "b1" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["language"], "zh");
        assert_eq!(created["survey"]["pages"][0]["title"], ZH.demographics.title);
        assert_eq!(created["switcher"]["text"], "English");
        let id = created["sessionId"].as_str().unwrap().to_string();

        let carried = json!({ "answers": { "age": "25_30" } });
        let (status, switched) = call(&app, "POST", &format!("/api/v1/session/{id}/language"), Some(carried)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(switched["language"], "en");
        assert_eq!(switched["data"]["age"], "25_30");
        let titles: Vec<_> = switched["survey"]["pages"].as_array().unwrap().iter().map(|p| p["title"].clone()).collect();
        assert_eq!(titles[0], EN.demographics.title);
        assert_eq!(titles[5], EN.feature_ranking.title);
        assert_eq!(
            switched["survey"]["pages"][1]["elements"][1]["choices"],
            created["survey"]["pages"][1]["elements"][1]["choices"]
        );

        // a fresh session for the same browser starts in English
        let (_, again) = call(&app, "POST", "/api/v1/session", Some(json!({ "clientId": "b1" }))).await;
        assert_eq!(again["language"], "en");

        let (_, fetched) = call(&app, "GET", &format!("/api/v1/session/{id}/survey"), None).await;
        assert_eq!(fetched["survey"]["locale"], "en");
    }

    #[tokio::test]
    async fn session_without_body_uses_default_language() {
        let app = build_router(Arc::new(state_with(Arc::new(RecordingSink::default()))));
        let (status, created) = call(&app, "POST", "/api/v1/session", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["language"], "zh");
        assert_eq!(created["privacyNotice"], ZH.privacy_notice);
    }

    #[tokio::test]
    async fn completion_round_trip_and_failure_message() {
        let app = build_router(Arc::new(state_with(Arc::new(RecordingSink { fail: true, ..Default::default() }))));
        let (_, created) = call(&app, "POST", "/api/v1/session", Some(json!({ "language": "en" }))).await;
        let id = created["sessionId"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/session/{id}/complete");

        let (status, body) = call(&app, "POST", &uri, Some(json!({ "answers": {} }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["missing"].as_array().unwrap().contains(&json!("thermal_comfort")));

        let complete = json!({
            "answers": answers_for(&created["survey"]),
            "viewport": { "width": 390, "height": 844 },
        });
        let (status, body) = call(&app, "POST", &uri, Some(complete.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], false);
        assert_eq!(body["message"], EN.save_error);

        let (status, _) = call(&app, "POST", &uri, Some(complete)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let app = build_router(Arc::new(state_with(Arc::new(RecordingSink::default()))));
        let (status, body) = call(&app, "GET", "/api/v1/session/not-a-uuid/survey", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not-a-uuid"));
    }
}
