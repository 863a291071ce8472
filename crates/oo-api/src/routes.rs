//! API routes

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{assets, meetings, performance, procurements, requests, todos, visitors};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api", api_router())
}

fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/todos", todos_router())
        .nest("/performance", performance_router())
        .nest("/requests", requests_router())
        .nest("/procurements", procurements_router())
        .nest("/assets", assets_router())
        .nest("/meetings", meetings_router())
        .nest("/visitors", visitors_router())
}

fn todos_router() -> Router<AppState> {
    Router::new()
        .route("/", get(todos::list_todos).post(todos::create_todo))
        .route("/all", get(todos::list_all_todos))
        .route("/users/:user_id/overall", get(todos::overall_stats))
        .route("/:id", patch(todos::update_todo).delete(todos::delete_todo))
        .route("/:id/start", patch(todos::start_todo))
        .route("/:id/submit", post(todos::submit_todo))
        .route("/:id/evaluate", post(todos::evaluate_todo))
        .route("/:id/improvement", post(todos::submit_improvement))
        .route("/:id/notes", patch(todos::add_note))
        .route("/:id/warnings", get(todos::list_warnings))
}

fn performance_router() -> Router<AppState> {
    Router::new()
        .route("/daily", get(performance::daily_report))
        .route("/leaderboard", get(performance::leaderboard))
}

fn requests_router() -> Router<AppState> {
    Router::new()
        .route("/", get(requests::list_requests).post(requests::create_request))
        .route("/:id/approve", patch(requests::approve_request))
        .route("/:id/reject", patch(requests::reject_request))
}

fn procurements_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(procurements::list_procurements).post(procurements::create_procurement),
    )
}

fn assets_router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::list_assets).post(assets::create_asset))
        .route("/:id/status", patch(assets::update_asset_status))
}

fn meetings_router() -> Router<AppState> {
    Router::new()
        .route("/", get(meetings::list_meetings).post(meetings::book_meeting))
        .route("/:id/start", patch(meetings::start_meeting))
        .route("/:id/end", patch(meetings::end_meeting))
        .route("/:id/force-end", patch(meetings::force_end_meeting))
}

fn visitors_router() -> Router<AppState> {
    Router::new()
        .route("/", get(visitors::list_visitors).post(visitors::register_visitor))
        .route("/:id", get(visitors::show_visitor))
        .route("/:id/check-in", patch(visitors::check_in_visitor))
        .route("/:id/check-out", patch(visitors::check_out_visitor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use oo_auth::{Authenticator, JwtService};
    use oo_core::config::AppConfig;
    use oo_core::time::FixedClock;
    use oo_core::Role;
    use oo_db::{MemoryUserDirectory, Stores};
    use oo_evidence::MemoryStorage;
    use oo_models::User;
    use oo_services::ServiceContext;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SECRET: &[u8] = b"router-test-secret-key-32-bytes!";
    const BOUNDARY: &str = "oo-test-boundary";

    struct TestApp {
        router: Router,
        state: AppState,
    }

    impl TestApp {
        async fn new() -> Self {
            let directory = Arc::new(MemoryUserDirectory::new());
            directory
                .add(User::new(7, "Budi Santoso", "budi@example.com", Role::User))
                .await;
            directory
                .add(User::new(2, "Dina", "dina@example.com", Role::Ga))
                .await;

            // Friday 09:00 at UTC+7
            let clock = Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2026, 10, 16, 2, 0, 0).unwrap(),
            ));
            let services = ServiceContext::from_config(
                &AppConfig::default(),
                Stores::in_memory(directory),
                Arc::new(MemoryStorage::new()),
                clock,
            )
            .unwrap();
            let state = AppState::new(services, Authenticator::new(JwtService::new(SECRET)));

            Self {
                router: router().with_state(state.clone()),
                state,
            }
        }

        fn owner(&self) -> String {
            self.bearer(7, "Budi Santoso", Role::User)
        }

        fn ga(&self) -> String {
            self.bearer(2, "Dina", Role::Ga)
        }

        fn bearer(&self, id: i64, name: &str, role: Role) -> String {
            let token = self.state.auth.jwt().create_token(id, name, role, 3600).unwrap();
            format!("Bearer {}", token)
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, body)
        }

        async fn json(&self, method: Method, uri: &str, auth: &str, body: Value) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }

        async fn empty(&self, method: Method, uri: &str, auth: &str) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, auth)
                .body(Body::empty())
                .unwrap();
            self.send(request).await
        }

        async fn multipart(
            &self,
            method: Method,
            uri: &str,
            auth: &str,
            fields: &[(&str, &str)],
            files: &[(&str, &str)],
        ) -> (StatusCode, Value) {
            let mut body = String::new();
            for (name, value) in fields {
                body.push_str(&format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                ));
            }
            for (name, file_name) in files {
                body.push_str(&format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\nfake-image-bytes\r\n"
                ));
            }
            body.push_str(&format!("--{BOUNDARY}--\r\n"));

            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, auth)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap();
            self.send(request).await
        }

        async fn create_todo(&self, title: &str) -> i64 {
            let (status, body) = self
                .json(Method::POST, "/api/todos", &self.owner(), json!({ "title": title }))
                .await;
            assert_eq!(status, StatusCode::CREATED);
            body["todo"]["id"].as_i64().unwrap()
        }
    }

    #[tokio::test]
    async fn test_requests_without_token_are_rejected() {
        let app = TestApp::new().await;
        let request = Request::builder().uri("/api/todos").body(Body::empty()).unwrap();
        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errorIdentifier"], "unauthorized");

        let (status, _) = app.empty(Method::GET, "/api/todos", "Bearer garbage").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_todo_lifecycle_over_http() {
        let app = TestApp::new().await;
        let id = app.create_todo("Clean meeting room").await;

        let (status, body) = app
            .empty(Method::PATCH, &format!("/api/todos/{id}/start"), &app.owner())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["todo"]["status"], "in_progress");

        let (status, body) = app
            .multipart(
                Method::POST,
                &format!("/api/todos/{id}/submit"),
                &app.owner(),
                &[],
                &[("evidence[]", "before.png"), ("evidence[]", "after.png")],
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Todo submitted for checking");
        let todo = &body["todo"];
        assert_eq!(todo["status"], "checking");
        assert_eq!(todo["evidence"].as_array().unwrap().len(), 2);
        assert_eq!(
            todo["evidence"][0]["path"],
            "evidence/2026/10/16/user-7/01-Budi Santoso-Jumat-20261016_090000-1.png"
        );
        assert_eq!(todo["evidence"][0]["exists"], true);
        assert_eq!(
            todo["evidence_name"],
            "01-Budi Santoso-Jumat-20261016_090000-1"
        );

        let (status, body) = app
            .json(
                Method::POST,
                &format!("/api/todos/{id}/evaluate"),
                &app.ga(),
                json!({ "action": "approve", "warning_points": 40, "notes": "Late" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Evaluation recorded");
        assert_eq!(body["todo"]["status"], "completed");
        assert_eq!(body["todo"]["checker_display"], "Dina (GA)");
        assert_eq!(body["warning"]["level"], "medium");
        assert!(body["todo"]["evidence"][0]["path"]
            .as_str()
            .unwrap()
            .ends_with("-1-Approved.png"));

        let (status, body) = app
            .empty(Method::GET, &format!("/api/todos/{id}/warnings"), &app.owner())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = app
            .empty(Method::GET, "/api/performance/daily", &app.owner())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_points"], 40);
        assert_eq!(body["score"], 87);
    }

    #[tokio::test]
    async fn test_submit_without_evidence_lists_field_errors() {
        let app = TestApp::new().await;
        let id = app.create_todo("Restock pantry").await;
        app.empty(Method::PATCH, &format!("/api/todos/{id}/start"), &app.owner())
            .await;

        let (status, body) = app
            .multipart(
                Method::POST,
                &format!("/api/todos/{id}/submit"),
                &app.owner(),
                &[],
                &[],
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errorIdentifier"], "validation_failed");
        assert!(body["errors"]["evidence"].is_array());
    }

    #[tokio::test]
    async fn test_text_update_accepts_json() {
        let app = TestApp::new().await;
        let id = app.create_todo("Draft").await;

        let (status, body) = app
            .json(
                Method::PATCH,
                &format!("/api/todos/{id}"),
                &app.owner(),
                json!({ "title": "Final", "due_date": "2026-10-20" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["todo"]["title"], "Final");
        assert_eq!(body["todo"]["formatted_due_date"], "20-10-2026");
        assert_eq!(body["todo"]["day_of_due_date"], "Selasa");
    }

    #[tokio::test]
    async fn test_text_update_clears_description() {
        let app = TestApp::new().await;
        let id = app.create_todo("Draft").await;
        let uri = format!("/api/todos/{id}");

        let (_, body) = app
            .json(Method::PATCH, &uri, &app.owner(), json!({ "description": "Floor 2" }))
            .await;
        assert_eq!(body["todo"]["description"], "Floor 2");

        let (_, body) = app
            .json(Method::PATCH, &uri, &app.owner(), json!({ "title": "Final" }))
            .await;
        assert_eq!(body["todo"]["description"], "Floor 2");

        let (status, body) = app
            .json(Method::PATCH, &uri, &app.owner(), json!({ "description": "" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["todo"]["description"].is_null());
    }

    #[tokio::test]
    async fn test_users_cannot_evaluate_or_list_all() {
        let app = TestApp::new().await;
        let id = app.create_todo("Water plants").await;

        let (status, body) = app
            .json(
                Method::POST,
                &format!("/api/todos/{id}/evaluate"),
                &app.owner(),
                json!({ "action": "approve" }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["errorIdentifier"], "forbidden");

        let (status, _) = app.empty(Method::GET, "/api/todos/all", &app.owner()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.empty(Method::GET, "/api/todos/all", &app.ga()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["user"]["name"], "Budi Santoso");
    }

    #[tokio::test]
    async fn test_request_approval_creates_asset() {
        let app = TestApp::new().await;
        let (status, body) = app
            .json(
                Method::POST,
                "/api/requests",
                &app.owner(),
                json!({ "item_name": "Whiteboard", "quantity": 1 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["request"]["id"].as_i64().unwrap();

        let (status, body) = app
            .empty(Method::PATCH, &format!("/api/requests/{id}/approve"), &app.ga())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["request"]["status"], "approved");
        assert_eq!(body["asset"]["status"], "not_received");
        assert_eq!(body["asset"]["category"], "Whiteboard");

        let (_, body) = app.empty(Method::GET, "/api/requests", &app.ga()).await;
        assert_eq!(body[0]["item_name"], "Whiteboard");
        assert_eq!(body[0]["user"]["id"], 7);
    }

    #[tokio::test]
    async fn test_visitor_registration_and_check_out() {
        let app = TestApp::new().await;
        let (status, body) = app
            .multipart(
                Method::POST,
                "/api/visitors",
                &app.owner(),
                &[("name", "andi wijaya"), ("meet_with", "Dina"), ("purpose", "Interview")],
                &[("ktp_image", "ktp.png"), ("face_image", "face.png")],
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["visitor"]["name"], "Andi Wijaya");
        assert!(body["visitor"]["ktp_image_url"]
            .as_str()
            .unwrap()
            .starts_with("/storage/visitors/2026/10/16/Andi Wijaya-01/ktp/"));
        let id = body["visitor"]["id"].as_i64().unwrap();

        let uri = format!("/api/visitors/{id}/check-out");
        let (status, _) = app.empty(Method::PATCH, &uri, &app.owner()).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = app.empty(Method::PATCH, &uri, &app.owner()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errorIdentifier"], "invalid_transition");

        let (status, body) = app
            .empty(Method::GET, "/api/visitors?search=andi", &app.owner())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["per_page"], 15);
    }

    #[tokio::test]
    async fn test_visitor_without_images_is_rejected() {
        let app = TestApp::new().await;
        let (status, body) = app
            .multipart(
                Method::POST,
                "/api/visitors",
                &app.owner(),
                &[("name", "Andi"), ("meet_with", "Dina"), ("purpose", "Delivery")],
                &[],
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["ktp_image"].is_array());
        assert!(body["errors"]["face_image"].is_array());
    }

    #[tokio::test]
    async fn test_leaderboard_month_validation() {
        let app = TestApp::new().await;
        let (status, body) = app
            .empty(Method::GET, "/api/performance/leaderboard?month=2026-10", &app.ga())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["data"][0]["rank"], 1);

        let (status, _) = app
            .empty(Method::GET, "/api/performance/leaderboard?month=2026-13", &app.ga())
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_meeting_force_end_requires_evaluator() {
        let app = TestApp::new().await;
        let (status, body) = app
            .json(
                Method::POST,
                "/api/meetings",
                &app.owner(),
                json!({
                    "room_name": "Ruang Rapat 1",
                    "agenda": "Weekly sync",
                    "start_time": "2026-10-16T03:00:00Z",
                    "end_time": "2026-10-16T04:00:00Z"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["meeting"]["id"].as_i64().unwrap();

        let uri = format!("/api/meetings/{id}/force-end");
        let (status, _) = app.empty(Method::PATCH, &uri, &app.owner()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = app.empty(Method::PATCH, &uri, &app.ga()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meeting"]["status"], "force_ended");
    }
}
