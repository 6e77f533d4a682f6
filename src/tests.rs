// End-to-end tests for the Belyv client
// Runs the real client stack against an in-process fake backend

use super::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::broadcast::error::TryRecvError;

use crate::auth::{RecordingNavigator, ROOT_ROUTE};
use crate::http::logging::REQUEST_ID_HEADER;
use crate::store::{keys, MemoryStore};
use crate::trainers::{SortOrder, TrainerForm, TrainerQuery, TrainerSortField};
use crate::users::OnboardUser;

// ============================================================================
// Fake backend
// ============================================================================

/// What the fake backend saw, shared with the test body
#[derive(Clone, Default)]
struct Backend {
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    request_ids: Arc<Mutex<Vec<String>>>,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
    parts: Arc<Mutex<Vec<(String, Option<String>, usize)>>>,
    content_types: Arc<Mutex<Vec<String>>>,
}

impl Backend {
    fn record(&self, headers: &HeaderMap) {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.auth_headers.lock().unwrap().push(auth);

        if let Some(id) = headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()) {
            self.request_ids.lock().unwrap().push(id.to_string());
        }
        if let Some(ct) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
            self.content_types.lock().unwrap().push(ct.to_string());
        }
    }

    fn last_auth(&self) -> Option<String> {
        self.auth_headers.lock().unwrap().last().cloned().flatten()
    }
}

async fn login(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.record(&headers);
    match body["password"].as_str() {
        Some("p") => (
            StatusCode::OK,
            Json(json!({
                "access": "tok123",
                "role": {"code": "ADMIN"},
                "permissions": ["STUDENT_CREATE"]
            })),
        ),
        Some("no-token") => (StatusCode::OK, Json(json!({"role": {"code": "ADMIN"}}))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        ),
    }
}

async fn list_roles(State(backend): State<Backend>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    backend.record(&headers);
    (
        StatusCode::OK,
        Json(json!([
            {"id": 1, "code": "ADMIN", "name": "Admin", "created_at": "2025-01-14T09:30:00Z"},
            {"id": 2, "code": "TRAINER", "name": "Trainer"}
        ])),
    )
}

async fn delete_role(State(backend): State<Backend>, headers: HeaderMap, Path(_id): Path<i64>) -> StatusCode {
    backend.record(&headers);
    StatusCode::NO_CONTENT
}

/// Rejects every token, like an expired session would
async fn rejecting(State(backend): State<Backend>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    backend.record(&headers);
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type"})),
    )
}

async fn assign_permissions(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.record(&headers);
    let count = body["permission_ids"].as_array().map_or(0, Vec::len);
    backend.bodies.lock().unwrap().push(body);
    (
        StatusCode::CREATED,
        Json(json!({"status": "success", "assigned_count": count})),
    )
}

async fn role_permissions(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    backend.record(&headers);
    backend.queries.lock().unwrap().push(query);
    (
        StatusCode::OK,
        Json(json!([
            {"id": 8, "role": 2, "permission": 5, "role_code": "TRAINER", "permission_code": "TRAINER_VIEW"}
        ])),
    )
}

async fn list_trainers(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    backend.record(&headers);
    backend.queries.lock().unwrap().push(query);
    (
        StatusCode::OK,
        Json(json!({
            "count": 11,
            "next": "http://localhost:8000/api/trainersdb/trainers/?page=3",
            "previous": "http://localhost:8000/api/trainersdb/trainers/",
            "results": [
                {"id": 4, "trainer_id": "TRN-0004", "name": "Asha", "years_of_experience": 6, "location": "Chennai"}
            ]
        })),
    )
}

async fn create_trainer(
    State(backend): State<Backend>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    backend.record(&headers);
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.unwrap();
        backend.parts.lock().unwrap().push((name, file_name, bytes.len()));
    }
    (
        StatusCode::CREATED,
        Json(json!({"id": 11, "trainer_id": "TRN-0011", "name": "Asha", "is_active": true})),
    )
}

async fn onboard(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.record(&headers);
    let email = body["email"].clone();
    backend.bodies.lock().unwrap().push(body);
    (
        StatusCode::CREATED,
        Json(json!({"status": "success", "user_id": 42, "email": email})),
    )
}

/// The user directory is read-only on the backend
async fn read_only(State(backend): State<Backend>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    backend.record(&headers);
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({"detail": "Method \"PATCH\" not allowed."})),
    )
}

async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/api/rbac/auth/login/", post(login))
        .route("/api/rbac/roles/", get(list_roles))
        .route("/api/rbac/roles/:id/", delete(delete_role))
        .route("/api/rbac/permissions/", get(rejecting))
        .route(
            "/api/rbac/role-permissions/",
            get(role_permissions).post(assign_permissions),
        )
        .route("/api/trainersdb/trainers/", get(list_trainers).post(create_trainer))
        .route("/api/profiles/onboard/", post(onboard))
        .route("/api/profiles/users/:id/", patch(read_only))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

// ============================================================================
// Test Helpers
// ============================================================================

struct Harness {
    client: BelyvClient,
    persistent: Arc<MemoryStore>,
    navigator: Arc<RecordingNavigator>,
    backend: Backend,
}

async fn harness() -> Harness {
    let backend = Backend::default();
    let base = spawn_backend(backend.clone()).await;
    let config = ClientConfig::new(&base, StoreConfig::Memory).unwrap();

    let persistent = Arc::new(MemoryStore::new());
    let navigator = Arc::new(RecordingNavigator::new());
    let client = BelyvClient::with_parts(&config, persistent.clone(), navigator.clone()).unwrap();

    Harness {
        client,
        persistent,
        navigator,
        backend,
    }
}

async fn logged_in() -> Harness {
    let h = harness().await;
    h.client
        .auth()
        .login(&Credentials::new("a@x.com", "p"))
        .await
        .expect("login against the fake backend should succeed");
    h
}

// ============================================================================
// Session lifecycle
// ============================================================================

#[tokio::test]
async fn test_login_persists_backend_session() {
    let h = harness().await;
    let mut events = h.client.subscribe();

    let record = h
        .client
        .auth()
        .login(&Credentials::new("a@x.com", "p"))
        .await
        .unwrap();

    assert_eq!(record.access_token, "tok123");
    assert_eq!(h.client.auth().access_token().as_deref(), Some("tok123"));
    assert!(h.client.auth().has_permission("STUDENT_CREATE"));
    assert!(h.client.auth().has_role("ADMIN"));
    assert!(h.client.auth().is_authenticated());
    assert_eq!(record.user.email, "a@x.com");

    assert_eq!(
        h.persistent.get(keys::IS_AUTHENTICATED).unwrap().as_deref(),
        Some("true")
    );
    assert_eq!(
        h.persistent.get(keys::LEGACY_ACCESS_TOKEN).unwrap().as_deref(),
        Some("tok123")
    );
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::LoggedIn {
            email: "a@x.com".to_string()
        }
    );
    // The login call itself goes out without a token
    assert_eq!(h.backend.last_auth(), None);
}

#[tokio::test]
async fn test_rejected_login_returns_backend_error() {
    let h = harness().await;

    let err = h
        .client
        .auth()
        .login(&Credentials::new("a@x.com", "wrong"))
        .await
        .unwrap_err();

    assert!(err.is_rejected_credentials());
    assert_eq!(err.status_code(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(
        err.error_message(),
        "No active account found with the given credentials"
    );
    assert_eq!(h.client.auth().current_session(), None);
    assert!(!h.client.auth().is_authenticated());
}

#[tokio::test]
async fn test_login_without_token_persists_nothing() {
    let h = harness().await;

    let err = h
        .client
        .auth()
        .login(&Credentials::new("a@x.com", "no-token"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::MissingToken));
    assert_eq!(h.persistent.get(keys::SESSION_RECORD).unwrap(), None);
    assert!(!h.client.auth().is_authenticated());
}

#[tokio::test]
async fn test_logout_then_no_session() {
    let h = logged_in().await;
    let mut events = h.client.subscribe();

    h.client.auth().logout();

    assert_eq!(h.client.auth().current_session(), None);
    assert!(!h.client.auth().has_permission("STUDENT_CREATE"));
    assert_eq!(h.navigator.routes(), vec![ROOT_ROUTE.to_string()]);
    assert!(h.client.auth().take_logout_transition());
    assert_eq!(events.try_recv().unwrap(), SessionEvent::LoggedOut);

    // Later requests go out unauthenticated
    h.client.roles().list_roles().await.unwrap();
    assert_eq!(h.backend.last_auth(), None);
}

// ============================================================================
// Interceptors
// ============================================================================

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let h = logged_in().await;

    let roles = h.client.roles().list_roles().await.unwrap();

    assert_eq!(roles.len(), 2);
    assert_eq!(h.backend.last_auth().as_deref(), Some("Bearer tok123"));
}

#[tokio::test]
async fn test_prefixed_legacy_token_gets_single_prefix() {
    let h = harness().await;
    h.persistent
        .set(keys::LEGACY_ACCESS_TOKEN, "Bearer tok")
        .unwrap();

    h.client.roles().list_roles().await.unwrap();

    assert_eq!(h.backend.last_auth().as_deref(), Some("Bearer tok"));
}

#[tokio::test]
async fn test_every_request_gets_a_request_id() {
    let h = logged_in().await;
    h.client.roles().list_roles().await.unwrap();

    let ids = h.backend.request_ids.lock().unwrap().clone();
    assert_eq!(ids.len(), 2);
    assert!(ids.iter().all(|id| id.starts_with("req_")));
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_unauthorized_response_clears_session() {
    let h = logged_in().await;
    let mut events = h.client.subscribe();

    let err = h.client.permissions().list_permissions().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(
        err.detail().as_deref(),
        Some("Given token not valid for any token type")
    );
    assert!(!h.client.auth().is_authenticated());
    assert!(h.client.auth().is_unauthorized());
    assert!(!h.client.auth().has_permission("STUDENT_CREATE"));
    assert_eq!(h.persistent.get(keys::LEGACY_ACCESS_TOKEN).unwrap(), None);

    assert_eq!(events.try_recv().unwrap(), SessionEvent::Unauthorized);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_next_login_clears_unauthorized_flag() {
    let h = logged_in().await;
    let _ = h.client.permissions().list_permissions().await;
    assert!(h.client.auth().is_unauthorized());

    h.client
        .auth()
        .login(&Credentials::new("a@x.com", "p"))
        .await
        .unwrap();

    assert!(!h.client.auth().is_unauthorized());
    assert!(h.client.auth().is_authenticated());
}

#[tokio::test]
async fn test_other_failures_leave_session_alone() {
    let h = logged_in().await;

    let err = h.client.users().set_user_active(3, false).await.unwrap_err();

    assert_eq!(err.status_code(), Some(StatusCode::METHOD_NOT_ALLOWED));
    assert!(h.client.auth().is_authenticated());
    assert!(!h.client.auth().is_unauthorized());
}

// ============================================================================
// Endpoint services
// ============================================================================

#[tokio::test]
async fn test_trainer_list_sends_filters() {
    let h = logged_in().await;
    let query = TrainerQuery::new()
        .page(2)
        .location("Chennai")
        .experience(Some(3), None)
        .order_by(TrainerSortField::Name, SortOrder::Desc);

    let page = h.client.trainers().list_trainers(&query).await.unwrap();

    assert_eq!(page.count, 11);
    assert!(page.has_next());
    assert_eq!(page.results[0].name.as_deref(), Some("Asha"));

    let sent = h.backend.queries.lock().unwrap().last().cloned().unwrap();
    assert_eq!(sent.get("page").map(String::as_str), Some("2"));
    assert_eq!(sent.get("location").map(String::as_str), Some("Chennai"));
    assert_eq!(
        sent.get("years_of_experience__gte").map(String::as_str),
        Some("3")
    );
    assert_eq!(sent.get("ordering").map(String::as_str), Some("-name"));
    assert!(!sent.contains_key("years_of_experience__lte"));
}

#[tokio::test]
async fn test_trainer_create_is_multipart() {
    let h = logged_in().await;
    let form = TrainerForm::new()
        .text("name", "Asha")
        .text("email", "asha@x.com")
        .list("stack", [1, 2])
        .file("profile_pic", "asha.png", "image/png", vec![0u8; 64]);

    let trainer = h.client.trainers().create_trainer(form).await.unwrap();

    assert_eq!(trainer.id, 11);
    assert_eq!(trainer.trainer_id.as_deref(), Some("TRN-0011"));

    let content_type = h.backend.content_types.lock().unwrap().last().cloned().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
    assert_eq!(h.backend.last_auth().as_deref(), Some("Bearer tok123"));

    let parts = h.backend.parts.lock().unwrap().clone();
    assert_eq!(
        parts,
        vec![
            ("name".to_string(), None, 4),
            ("email".to_string(), None, 10),
            ("stack".to_string(), None, 1),
            ("stack".to_string(), None, 1),
            ("profile_pic".to_string(), Some("asha.png".to_string()), 64),
        ]
    );
}

#[tokio::test]
async fn test_permission_assignment_round() {
    let h = logged_in().await;
    let permissions = h.client.permissions();

    let result = permissions
        .assign_permissions_to_role(2, vec![5, 6])
        .await
        .unwrap();
    assert_eq!(result.status, "success");
    assert_eq!(result.assigned_count, 2);
    assert_eq!(
        h.backend.bodies.lock().unwrap().last().cloned().unwrap(),
        json!({"role_id": 2, "permission_ids": [5, 6]})
    );

    let links = permissions.role_permissions(2).await.unwrap();
    assert_eq!(links[0].permission_code.as_deref(), Some("TRAINER_VIEW"));
    let sent = h.backend.queries.lock().unwrap().last().cloned().unwrap();
    assert_eq!(sent.get("role_id").map(String::as_str), Some("2"));
}

#[tokio::test]
async fn test_invalid_payload_never_reaches_backend() {
    let h = logged_in().await;
    let before = h.backend.auth_headers.lock().unwrap().len();

    let err = h
        .client
        .permissions()
        .assign_permissions_to_role(2, vec![0])
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(h.backend.auth_headers.lock().unwrap().len(), before);
}

#[tokio::test]
async fn test_onboard_and_delete() {
    let h = logged_in().await;

    let user = OnboardUser::new("s@x.com", "Sam", "pw", "STUDENT").extra("University", "Anna Univ");
    let result = h.client.users().onboard_user(&user).await.unwrap();
    assert_eq!(result.user_id, 42);
    assert_eq!(result.email, "s@x.com");
    assert_eq!(
        h.backend.bodies.lock().unwrap().last().cloned().unwrap()["extra_data"],
        json!({"University": "Anna Univ"})
    );

    h.client.roles().delete_role(2).await.unwrap();
}
