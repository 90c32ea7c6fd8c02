//! Commands Layer
//!
//! HTTP handlers that bridge JSON requests to the repositories.

mod course_cmd;
mod batch_cmd;
mod section_cmd;
mod session_cmd;
mod enrollment_cmd;
mod instructor_cmd;
mod blog_cmd;
mod payment_cmd;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::domain::DomainError;
use crate::AppState;

pub use course_cmd::*;
pub use batch_cmd::*;
pub use section_cmd::*;
pub use session_cmd::*;
pub use enrollment_cmd::*;
pub use instructor_cmd::*;
pub use blog_cmd::*;
pub use payment_cmd::*;

/// Shared handler state
pub type SharedState = Arc<AppState>;

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// JSON request body; malformed or mistyped bodies are answered with the
/// `ApiResponse` error envelope instead of axum's plain-text rejection
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(DomainError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for DomainError {
    fn from(rejection: JsonRejection) -> Self {
        DomainError::InvalidInput(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, DomainError>;
pub type CreatedResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), DomainError>;

pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

pub(crate) fn created<T>(data: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::InvalidInput(_) | DomainError::InvalidOrder(_) | DomainError::ScopeMismatch(_) => {
            StatusCode::BAD_REQUEST
        }
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::debug!("Request rejected: {}", self);
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parse an optional `order` field; `None` when absent or null
pub(crate) fn optional_order(value: Option<&serde_json::Value>) -> Result<Option<i64>, DomainError> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => crate::domain::ordering::parse_requested_order(v).map(Some),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub database_ready: bool,
}

async fn health(State(state): State<SharedState>) -> Json<ApiResponse<HealthStatus>> {
    let database_ready = state.db_state.is_ready().await;
    Json(ApiResponse::success(HealthStatus {
        status: if database_ready { "ok" } else { "degraded" }.to_string(),
        database_ready,
    }))
}

/// Most recent server log lines, oldest first
async fn recent_logs() -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::success(rolling_logger::recent_lines()))
}

/// Build the API router
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/logs/recent", get(recent_logs))
        // Courses
        .route("/api/courses", post(create_course).get(list_courses))
        .route(
            "/api/courses/{id}",
            get(get_course).patch(update_course).delete(delete_course),
        )
        // Batches
        .route(
            "/api/courses/{id}/batches",
            post(create_batch).get(list_batches),
        )
        .route(
            "/api/batches/{id}",
            get(get_batch).patch(update_batch).delete(delete_batch),
        )
        // Sections
        .route(
            "/api/batches/{id}/sections",
            post(create_section).get(list_sections),
        )
        .route(
            "/api/sections/{id}",
            axum::routing::patch(update_section).delete(delete_section),
        )
        // Sessions
        .route(
            "/api/batches/{id}/sessions",
            post(create_session).get(list_batch_sessions),
        )
        .route("/api/sections/{id}/sessions", get(list_section_sessions))
        .route("/api/sessions/reorder", post(reorder_session))
        .route(
            "/api/sessions/{id}",
            get(get_session).patch(update_session).delete(delete_session),
        )
        // Enrollments
        .route(
            "/api/batches/{id}/enrollments",
            post(enroll).get(list_enrollments),
        )
        .route("/api/enrollments/{id}", axum::routing::delete(cancel_enrollment))
        .route(
            "/api/enrollments/{id}/progress",
            post(set_progress).get(get_progress),
        )
        // Payments (stub)
        .route(
            "/api/enrollments/{id}/payments",
            post(open_payment).get(list_payments),
        )
        .route("/api/payments/{id}", get(get_payment).patch(update_payment_status))
        // Instructors
        .route("/api/instructors", post(create_instructor).get(list_instructors))
        .route(
            "/api/instructors/{id}",
            get(get_instructor).patch(update_instructor).delete(delete_instructor),
        )
        .route("/api/courses/{id}/instructors", get(list_course_instructors))
        .route(
            "/api/courses/{id}/instructors/{instructor_id}",
            put(assign_instructor).delete(unassign_instructor),
        )
        // Blog
        .route("/api/blogs", post(create_post).get(list_posts))
        .route("/api/blogs/slug/{slug}", get(get_post_by_slug))
        .route(
            "/api/blogs/{id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::init_db;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    async fn app() -> (SharedState, Router) {
        let db = init_db(std::path::Path::new(":memory:")).await.unwrap();
        let state = Arc::new(AppState::new(db));
        (state.clone(), router(state))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if body.is_some() {
            request = request.header("content-type", "application/json");
        }
        let request = request
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn assert_error_envelope(value: &serde_json::Value) {
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["data"], json!(null));
        assert!(value["error"].is_string(), "{}", value);
    }

    #[tokio::test]
    async fn test_malformed_bodies_use_error_envelope() {
        let (_, app) = app().await;

        let (status, value) = send(&app, "POST", "/api/sessions/reorder", Some(r#"{"order":1}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_envelope(&value);
        assert!(value["error"].as_str().unwrap().contains("session_id"));

        for body in [r#"{"session_id": 5, "order": 1}"#, "{not json", ""] {
            let (status, value) = send(&app, "POST", "/api/sessions/reorder", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
            assert_error_envelope(&value);
        }

        let (status, value) = send(&app, "POST", "/api/courses", Some(r#"{"price_cents": "ten"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_envelope(&value);
    }

    #[tokio::test]
    async fn test_missing_content_type_uses_error_envelope() {
        let (_, app) = app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/courses")
            .body(Body::from(r#"{"title":"Rust"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_error_envelope(&value);
    }

    #[tokio::test]
    async fn test_domain_errors_through_router() {
        let (_, app) = app().await;

        let (status, value) = send(&app, "GET", "/api/courses/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_error_envelope(&value);

        let (status, value) =
            send(&app, "POST", "/api/sessions/reorder", Some(r#"{"session_id":"x","order":"soon"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["error"].as_str().unwrap().starts_with("Invalid order"));
    }

    #[tokio::test]
    async fn test_course_staff_blog_and_payment_routes() {
        let (_, app) = app().await;

        let (status, course) = send(
            &app,
            "POST",
            "/api/courses",
            Some(r#"{"title":"Rust","price_cents":5000,"discount_percent":10}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(course["data"]["effective_price_cents"], json!(4500));
        let course_id = course["data"]["id"].as_str().unwrap().to_string();

        let (_, instructor) = send(
            &app,
            "POST",
            "/api/instructors",
            Some(r#"{"name":"Ada","email":"ada@example.com"}"#),
        )
        .await;
        let instructor_id = instructor["data"]["id"].as_str().unwrap().to_string();

        let uri = format!("/api/courses/{}/instructors/{}", course_id, instructor_id);
        let (status, staff) = send(&app, "PUT", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(staff["data"][0]["name"], json!("Ada"));
        let (status, _) = send(&app, "PUT", &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, post) = send(
            &app,
            "POST",
            "/api/blogs",
            Some(r#"{"title":"Course Launch","body":"Soon","published":true}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(post["data"]["slug"], json!("course-launch"));
        let (status, by_slug) = send(&app, "GET", "/api/blogs/slug/course-launch", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_slug["data"]["id"], post["data"]["id"]);

        let (_, batch) = send(
            &app,
            "POST",
            &format!("/api/courses/{}/batches", course_id),
            Some(r#"{"name":"Spring"}"#),
        )
        .await;
        let batch_id = batch["data"]["id"].as_str().unwrap().to_string();
        let (_, enrollment) = send(
            &app,
            "POST",
            &format!("/api/batches/{}/enrollments", batch_id),
            Some(r#"{"student_id":"alice"}"#),
        )
        .await;
        let enrollment_id = enrollment["data"]["id"].as_str().unwrap().to_string();

        let (status, payment) =
            send(&app, "POST", &format!("/api/enrollments/{}/payments", enrollment_id), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(payment["data"]["amount_cents"], json!(4500));

        let payment_uri = format!("/api/payments/{}", payment["data"]["id"].as_str().unwrap());
        let (status, paid) = send(&app, "PATCH", &payment_uri, Some(r#"{"status":"paid"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["data"]["status"], json!("paid"));

        let (status, value) = send(&app, "PATCH", &payment_uri, Some(r#"{"status":"settled"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_envelope(&value);
    }

    #[tokio::test]
    async fn test_health_reports_database_state() {
        let (state, app) = app().await;

        let (status, value) = send(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["data"]["database_ready"], json!(true));

        state.db_state.close().await;
        let (_, value) = send(&app, "GET", "/api/health", None).await;
        assert_eq!(value["data"]["status"], json!("degraded"));
    }

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        section_id: Option<Option<String>>,
    }

    #[test]
    fn test_double_option() {
        let absent: Patch = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.section_id, None);

        let null: Patch = serde_json::from_value(json!({ "section_id": null })).unwrap();
        assert_eq!(null.section_id, Some(None));

        let set: Patch = serde_json::from_value(json!({ "section_id": "s1" })).unwrap();
        assert_eq!(set.section_id, Some(Some("s1".to_string())));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&DomainError::InvalidOrder("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&DomainError::ScopeMismatch("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&DomainError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&DomainError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&DomainError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_optional_order() {
        assert_eq!(optional_order(None).unwrap(), None);
        assert_eq!(optional_order(Some(&json!(null))).unwrap(), None);
        assert_eq!(optional_order(Some(&json!("4"))).unwrap(), Some(4));
        assert!(matches!(
            optional_order(Some(&json!("four"))),
            Err(DomainError::InvalidOrder(_))
        ));
    }
}
