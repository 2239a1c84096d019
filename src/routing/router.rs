//! Fixed route table.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::health::health_handler;
use crate::http::server::AppState;
use crate::portfolio::handlers;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiter};

pub const HEALTH: &str = "/health";
pub const PROFILE: &str = "/api/v1/profiles/{id}";
pub const SKILLS: &str = "/api/v1/profiles/{id}/skills";
pub const PROJECTS: &str = "/api/v1/profiles/{id}/projects";
pub const CERTIFICATES: &str = "/api/v1/profiles/{id}/certificates";
pub const CONTACTS: &str = "/api/v1/profiles/{id}/contacts";
pub const QUESTIONS: &str = "/api/v1/profiles/{id}/questions";

/// Stricter limiters for the two write routes. They wrap the POST handlers
/// only, so a 405 for another method never spends route quota.
#[derive(Debug, Clone)]
pub struct RouteLimiters {
    pub contacts: Arc<RateLimiter>,
    pub questions: Arc<RateLimiter>,
}

pub fn build_routes(state: AppState, limiters: RouteLimiters) -> Router {
    Router::new()
        .route(HEALTH, get(health_handler))
        .route(PROFILE, get(handlers::get_profile))
        .route(SKILLS, get(handlers::list_skills))
        .route(PROJECTS, get(handlers::list_projects))
        .route(CERTIFICATES, get(handlers::list_certificates))
        .route(
            CONTACTS,
            post(handlers::create_contact).route_layer(middleware::from_fn_with_state(
                limiters.contacts,
                rate_limit_middleware,
            )),
        )
        .route(
            QUESTIONS,
            post(handlers::create_question).route_layer(middleware::from_fn_with_state(
                limiters.questions,
                rate_limit_middleware,
            )),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::pipeline::Pipeline;
    use crate::security::client_ip::X_FORWARDED_FOR;
    use crate::security::clock::ManualClock;
    use crate::security::limits::BodyLimit;
    use crate::security::RateLimiterConfig;
    use crate::store::MemoryStore;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    const PROFILE_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

    struct Harness {
        app: Router,
        clock: ManualClock,
        store: Arc<MemoryStore>,
    }

    fn limiter(name: &'static str, limit: usize, clock: &ManualClock) -> Arc<RateLimiter> {
        Arc::new(RateLimiter::new(
            name,
            RateLimiterConfig::new(limit, Duration::from_secs(60)).unwrap(),
            Arc::new(clock.clone()),
        ))
    }

    fn harness(global_limit: usize, route_limit: usize) -> Harness {
        let clock = ManualClock::default();
        let store = Arc::new(
            MemoryStore::from_seed(json!({
                "profiles": [{
                    "id": PROFILE_ID,
                    "name": "Ada",
                    "title": "Engineer",
                    "createdAt": "2024-01-01T00:00:00Z",
                    "updatedAt": "2024-01-01T00:00:00Z"
                }]
            }))
            .unwrap(),
        );
        let global = limiter("global", global_limit, &clock);
        let routes = build_routes(
            AppState::new(store.clone()),
            RouteLimiters {
                contacts: limiter("contacts", route_limit, &clock),
                questions: limiter("questions", route_limit, &clock),
            },
        );
        let app = Pipeline {
            global_limiter: global,
            body_limit: BodyLimit(1024),
            allowed_origins: vec!["*".to_string()],
        }
        .wrap(routes);

        Harness { app, clock, store }
    }

    fn request(method: Method, path: &str, client: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(path)
            .header(X_FORWARDED_FOR, client);
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn question(client: &str) -> Request<Body> {
        request(
            Method::POST,
            &format!("/api/v1/profiles/{PROFILE_ID}/questions"),
            client,
            Some(json!({"message": "Is this still open?"})),
        )
    }

    fn contact(client: &str) -> Request<Body> {
        request(
            Method::POST,
            &format!("/api/v1/profiles/{PROFILE_ID}/contacts"),
            client,
            Some(json!({
                "name": "Grace",
                "email": "grace@example.com",
                "message": "Would love to chat about a role."
            })),
        )
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_route_limiter_then_window_slides() {
        let h = harness(100, 3);

        for _ in 0..3 {
            let response = h.app.clone().oneshot(question("10.0.0.1")).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let rejected = h.app.clone().oneshot(question("10.0.0.1")).await.unwrap();
        assert_eq!(rejected.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(rejected.headers()[header::RETRY_AFTER], "60");
        assert_eq!(
            body_json(rejected).await["error"]["code"],
            "RATE_LIMIT_EXCEEDED"
        );

        h.clock.advance(Duration::from_secs(61));
        let response = h.app.clone().oneshot(question("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_exhausting_one_route_leaves_other_route_open() {
        let h = harness(5, 2);
        let profile = || {
            request(
                Method::GET,
                &format!("/api/v1/profiles/{PROFILE_ID}"),
                "10.0.0.1",
                None,
            )
        };

        for _ in 0..2 {
            let response = h.app.clone().oneshot(question("10.0.0.1")).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }
        let rejected = h.app.clone().oneshot(question("10.0.0.1")).await.unwrap();
        assert_eq!(rejected.status(), StatusCode::TOO_MANY_REQUESTS);

        let response = h.app.clone().oneshot(contact("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        // Global saw four requests, once each; one slot remains.
        let response = h.app.clone().oneshot(profile()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let response = h.app.clone().oneshot(profile()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_route_rejections_still_count_against_global() {
        // Global allows 4. Route allows 1. Route rejections passed the
        // global limiter first, so they spend global quota.
        let h = harness(4, 1);

        let first = h.app.clone().oneshot(question("10.0.0.9")).await.unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        for _ in 0..3 {
            let response = h.app.clone().oneshot(question("10.0.0.9")).await.unwrap();
            assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        }

        let profile = request(
            Method::GET,
            &format!("/api/v1/profiles/{PROFILE_ID}"),
            "10.0.0.9",
            None,
        );
        let response = h.app.clone().oneshot(profile).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        // Another client is untouched.
        let profile = request(
            Method::GET,
            &format!("/api/v1/profiles/{PROFILE_ID}"),
            "10.0.0.10",
            None,
        );
        let response = h.app.clone().oneshot(profile).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wrong_method_does_not_spend_route_quota() {
        let h = harness(100, 2);
        let path = format!("/api/v1/profiles/{PROFILE_ID}/questions");

        for _ in 0..2 {
            let get = request(Method::GET, &path, "1.1.1.1", None);
            let response = h.app.clone().oneshot(get).await.unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        }

        for _ in 0..2 {
            let response = h.app.clone().oneshot(question("1.1.1.1")).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }
        let rejected = h.app.clone().oneshot(question("1.1.1.1")).await.unwrap();
        assert_eq!(rejected.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_health_spends_global_quota() {
        let h = harness(2, 1);
        let health = || request(Method::GET, HEALTH, "10.0.0.3", None);

        for _ in 0..2 {
            let response = h.app.clone().oneshot(health()).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = h.app.clone().oneshot(health()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_read_routes_have_no_route_limiter() {
        let h = harness(100, 1);
        for _ in 0..5 {
            let skills = request(
                Method::GET,
                &format!("/api/v1/profiles/{PROFILE_ID}/skills"),
                "10.0.0.1",
                None,
            );
            let response = h.app.clone().oneshot(skills).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await, json!({"skills": []}));
        }
    }

    #[tokio::test]
    async fn test_invalid_profile_id_is_bad_request() {
        let h = harness(100, 5);
        let response = h
            .app
            .clone()
            .oneshot(request(
                Method::GET,
                "/api/v1/profiles/not-a-uuid",
                "10.0.0.1",
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(body["error"]["message"], "Invalid profile ID format");
    }

    #[tokio::test]
    async fn test_unknown_profile_is_not_found() {
        let h = harness(100, 5);
        let response = h
            .app
            .clone()
            .oneshot(request(
                Method::GET,
                "/api/v1/profiles/00000000-0000-4000-8000-000000000000/projects",
                "10.0.0.1",
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["message"], "profile not found");
    }

    #[tokio::test]
    async fn test_contact_is_sanitised_before_validation() {
        let h = harness(100, 5);
        let response = h
            .app
            .clone()
            .oneshot(request(
                Method::POST,
                &format!("/api/v1/profiles/{PROFILE_ID}/contacts"),
                "10.0.0.1",
                Some(json!({
                    "name": "<b>G</b>",
                    "email": "not-an-email",
                    "message": "<p>hi</p>"
                })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        let fields: Vec<_> = body["error"]["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(fields, vec!["email", "message", "name"]);
    }

    #[tokio::test]
    async fn test_contact_created() {
        let h = harness(100, 5);
        let response = h.app.clone().oneshot(contact("10.0.0.1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Contact message sent successfully");
        assert!(body["id"].is_string());
        assert!(body["contactedAt"].is_null());
    }

    #[tokio::test]
    async fn test_malformed_and_oversized_bodies() {
        let h = harness(100, 10);
        let path = format!("/api/v1/profiles/{PROFILE_ID}/questions");

        let malformed = Request::builder()
            .method(Method::POST)
            .uri(&path)
            .header(X_FORWARDED_FOR, "10.0.0.1")
            .body(Body::from("{not json"))
            .unwrap();
        let response = h.app.clone().oneshot(malformed).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["message"], "Invalid request body");

        let huge = json!({"message": "x".repeat(4096)});
        let response = h
            .app
            .clone()
            .oneshot(request(Method::POST, &path, "10.0.0.1", Some(huge)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_health_reports_store_state() {
        let h = harness(100, 5);
        let health = || request(Method::GET, HEALTH, "10.0.0.1", None);

        let response = h.app.clone().oneshot(health()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "connected");
        assert_eq!(body["version"]["version"], env!("CARGO_PKG_VERSION"));

        h.store.set_available(false);
        let response = h.app.clone().oneshot(health()).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["database"], "disconnected");
    }
}
