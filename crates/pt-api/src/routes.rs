//! API routes

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::extractors::AppState;
use crate::handlers::{auth, documents, leads, notifications, projects, tasks, users};

/// Create the complete API router
pub fn router(state: AppState) -> Router {
    Router::new().nest("/api", api_router()).with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me).patch(auth::update_me))
        .nest("/projects", projects_router())
        .nest("/tasks", tasks_router())
        .nest("/leads", leads_router())
        .nest("/notifications", notifications_router())
        .nest("/users", users_router())
        .route("/documents/:id/download", get(documents::download_document))
        .route("/document-types", get(documents::document_types))
        .route(
            "/budget-categories",
            get(projects::budget_categories).post(projects::create_budget_category),
        )
}

fn projects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list_projects).post(projects::create_project))
        .route("/:id", get(projects::get_project))
        .route("/:id/stages", post(projects::add_stage))
        .route("/:id/budget", post(projects::add_budget_item))
        .route(
            "/:id/messages",
            get(projects::list_messages).post(projects::post_message),
        )
        .route(
            "/:id/documents",
            get(documents::list_documents).post(documents::upload_document),
        )
        .route("/:id/export/:kind", get(projects::export_project))
}

fn tasks_router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route("/:id", get(tasks::get_task))
        .route("/:id/complete", post(tasks::complete_task))
        .route("/:id/status", post(tasks::change_status))
        .route("/:id/history", get(tasks::history))
}

fn leads_router() -> Router<AppState> {
    Router::new()
        .route("/", get(leads::list_leads).post(leads::create_lead))
        .route("/:id", get(leads::get_lead))
        .route("/:id/approve", post(leads::approve_lead))
        .route("/:id/reject", post(leads::reject_lead))
        .route("/:id/attachment", get(leads::download_attachment))
}

fn notifications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::feed))
        .route("/unread", get(notifications::unread_count))
        .route("/read", post(notifications::mark_all_read))
}

fn users_router() -> Router<AppState> {
    Router::new()
        .route("/employees", get(users::employees))
        .route("/customers", get(users::customers))
        .route("/workload", get(users::workload))
}

async fn api_root() -> Json<ApiRoot> {
    Json(ApiRoot {
        instance_name: "Project Tracker",
        core_version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRoot {
    instance_name: &'static str,
    core_version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use pt_core::config::{AppConfig, SeedConfig};
    use pt_db::MemoryStore;
    use pt_files::MemoryStorage;
    use pt_services::Tracker;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        let config = AppConfig::default();
        let tracker = Tracker::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStorage::default()),
            &config.auth,
        );
        tracker
            .seed(&SeedConfig {
                lookups: true,
                demo_users: true,
                demo_password: "123".into(),
            })
            .await
            .unwrap();
        router(AppState::new(Arc::new(tracker)))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn login(app: &Router, username: &str) -> String {
        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/api/login",
                None,
                json!({ "username": username, "password": "123" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_api_root() {
        let app = app().await;
        let (status, body) = send(&app, get_request("/api", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["instanceName"], "Project Tracker");
    }

    #[tokio::test]
    async fn test_anonymous_and_bad_tokens_are_unauthorized() {
        let app = app().await;

        let (status, body) = send(&app, get_request("/api/projects", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errorIdentifier"], "urn:project-tracker:errors:Unauthenticated");

        let (status, _) = send(&app, get_request("/api/projects", Some("garbage"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            json_request(
                Method::POST,
                "/api/login",
                None,
                json!({ "username": "pm", "password": "wrong" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_task_flow_over_http() {
        let app = app().await;
        let pm = login(&app, "pm").await;
        let emp = login(&app, "emp").await;
        let cust = login(&app, "cust").await;

        let (_, me) = send(&app, get_request("/api/me", Some(&cust))).await;
        let customer_id = me["id"].as_i64().unwrap();
        let (_, employees) = send(&app, get_request("/api/users/employees", Some(&pm))).await;
        let employee_id = employees[0]["id"].as_i64().unwrap();

        let (status, project) = send(
            &app,
            json_request(
                Method::POST,
                "/api/projects",
                Some(&pm),
                json!({
                    "title": "Website",
                    "description": "Corporate site",
                    "customerId": customer_id,
                    "startDate": "2024-03-01",
                    "plannedBudget": "100000"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let project_id = project["id"].as_i64().unwrap();

        let (status, task) = send(
            &app,
            json_request(
                Method::POST,
                "/api/tasks",
                Some(&pm),
                json!({
                    "title": "Layout",
                    "projectId": project_id,
                    "assigneeId": employee_id,
                    "deadline": "2024-04-01",
                    "cost": "15000"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let complete_uri = format!("/api/tasks/{}/complete", task["id"]);

        let (status, body) = send(
            &app,
            json_request(Method::POST, &complete_uri, Some(&cust), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["errorIdentifier"], "urn:project-tracker:errors:MissingPermission");

        let (status, done) = send(
            &app,
            json_request(Method::POST, &complete_uri, Some(&emp), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(done["status"], "done");

        let status_uri = format!("/api/tasks/{}/status", task["id"]);
        let (status, _) = send(
            &app,
            json_request(Method::POST, &status_uri, Some(&pm), json!({ "status": "in_progress" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, unread) = send(&app, get_request("/api/notifications/unread", Some(&pm))).await;
        assert_eq!(unread["unread"], 1);
    }

    #[tokio::test]
    async fn test_hidden_project_is_not_found() {
        let app = app().await;
        let emp = login(&app, "emp").await;
        let (status, body) = send(&app, get_request("/api/projects/1", Some(&emp))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errorIdentifier"], "urn:project-tracker:errors:NotFound");
    }

    #[tokio::test]
    async fn test_validation_errors_list_fields() {
        let app = app().await;
        let emp = login(&app, "emp").await;
        let (status, body) = send(
            &app,
            json_request(
                Method::PATCH,
                "/api/me",
                Some(&emp),
                json!({ "fullName": "Sidorov", "email": "not-an-email" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["email"].is_array());
    }
}
