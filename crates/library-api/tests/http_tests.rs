//! HTTP-level tests against the full router with in-memory adapters.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use library_api::{build_router, AppState, Ports};
use library_core::testing::{student_identity, InMemoryLibrary, MemoryCoverStore, StubGateway};
use library_core::{CategoryInput, Role, User, UserStatus};
use library_security::JwtService;
use library_shared::config::{
    AppConfig, AppSettings, CampusSettings, DatabaseSettings, JwtSettings, RateLimitSettings, UploadSettings,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "http-test-secret";

fn config(auth_per_minute: u32) -> AppConfig {
    AppConfig {
        app: AppSettings {
            env: "test".into(),
            host: "127.0.0.1".into(),
            port: 0,
            name: "library-test".into(),
            utc_offset_hours: 7,
            default_institution: "UMC".into(),
            cors_origin: "*".into(),
        },
        database: DatabaseSettings { url: String::new(), max_connections: 1, min_connections: 0 },
        jwt: JwtSettings { secret: SECRET.into(), access_token_expiry: 3600 },
        campus: CampusSettings { base_url: None, timeout_secs: 5 },
        uploads: UploadSettings { dir: "uploads".into(), public_path: "/uploads".into(), max_body_mb: 5 },
        rate_limit: RateLimitSettings { auth_per_minute },
    }
}

struct TestApp {
    router: Router,
    store: Arc<InMemoryLibrary>,
    gateway: Arc<StubGateway>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_auth_limit(100)
    }

    fn with_auth_limit(auth_per_minute: u32) -> Self {
        let store = Arc::new(InMemoryLibrary::new());
        let gateway = Arc::new(StubGateway::new());
        let ports = Ports {
            users: store.clone(),
            members: store.clone(),
            categories: store.clone(),
            collections: store.clone(),
            guest_logs: store.clone(),
            gateway: gateway.clone(),
            covers: Arc::new(MemoryCoverStore::new()),
        };
        let router = build_router(AppState::new(ports, &config(auth_per_minute)));
        Self { router, store, gateway }
    }

    /// Seeds a user with `role` and returns a bearer token for it.
    fn token_for(&self, role: Role) -> String {
        let user = User::verified(format!("{} user", role.as_str()), format!("{}@campus.ac.id", role.as_str()), role);
        self.store.seed_user(user.clone());
        JwtService::new(SECRET.into(), 3600)
            .generate_access_token(&user.id, role.as_str())
            .unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }

    async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }
}

fn multipart(fields: &[(&str, &str)]) -> (String, Body) {
    let boundary = "library-test-boundary";
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    (format!("multipart/form-data; boundary={boundary}"), Body::from(body))
}

fn clean_code(category_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("title", "Clean Code".to_string()),
        ("author", "Robert C. Martin".to_string()),
        ("publisher", "Prentice Hall".to_string()),
        ("publicationYear", "2008".to_string()),
        ("type", "physical_book".to_string()),
        ("categoryId", category_id.to_string()),
    ]
}

async fn post_collection(app: &TestApp, token: &str, fields: Vec<(&'static str, String)>) -> (StatusCode, Value) {
    let pairs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let (content_type, body) = multipart(&pairs);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/collections")
        .header(header::CONTENT_TYPE, content_type)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(body)
        .unwrap();
    app.send(request).await
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn unknown_route_is_enveloped() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn category_writes_require_staff() {
    let app = TestApp::new();
    let payload = json!({ "name": "Teknologi" });

    let (status, body) = app.json(Method::POST, "/api/categories", None, payload.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], Value::Null);

    let student = app.token_for(Role::Student);
    let (status, _) = app.json(Method::POST, "/api/categories", Some(&student), payload).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.store.categories().is_empty());
}

#[tokio::test]
async fn duplicate_category_conflicts() {
    let app = TestApp::new();
    let staff = app.token_for(Role::Staff);

    let (status, body) = app
        .json(Method::POST, "/api/categories", Some(&staff), json!({ "name": "Teknologi" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Teknologi");

    let (status, body) = app
        .json(Method::POST, "/api/categories", Some(&staff), json!({ "name": " Teknologi " }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = app.get("/api/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_used_category_conflicts() {
    let app = TestApp::new();
    let staff = app.token_for(Role::SuperAdmin);
    let category = app
        .store
        .create_category(CategoryInput { name: "Fiksi".into(), description: None })
        .await;
    app.store.seed_collection(category.id, "Laskar Pelangi");

    let (status, _) = app
        .json(Method::DELETE, &format!("/api/categories/{}", category.id), Some(&staff), Value::Null)
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.store.categories().len(), 1);
    assert_eq!(app.store.collections().len(), 1);
}

#[tokio::test]
async fn create_collection_with_existing_category() {
    let app = TestApp::new();
    let staff = app.token_for(Role::Staff);
    let category = app
        .store
        .create_category(CategoryInput { name: "Teknologi".into(), description: None })
        .await;

    let (status, body) = post_collection(&app, &staff, clean_code(&category.id.to_string())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["id"].as_i64().unwrap() > 0);
    assert_eq!(body["data"]["type"], "physical_book");

    let (status, body) = app.get("/api/collections", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["category"]["name"], "Teknologi");
}

#[tokio::test]
async fn create_collection_with_unknown_category_fails() {
    let app = TestApp::new();
    let staff = app.token_for(Role::Staff);

    let (status, body) = post_collection(&app, &staff, clean_code("9999")).await;

    assert!(!status.is_success());
    assert_eq!(body["success"], false);
    assert!(app.store.collections().is_empty());
}

#[tokio::test]
async fn invalid_collection_form_is_bad_request() {
    let app = TestApp::new();
    let staff = app.token_for(Role::Staff);
    let mut fields = clean_code("1");
    fields[3] = ("publicationYear", "08".to_string());

    let (status, _) = post_collection(&app, &staff, fields).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn guest_check_in_twice_conflicts_with_original() {
    let app = TestApp::new();
    let staff = app.token_for(Role::Staff);
    app.gateway.insert(student_identity("guest@campus.ac.id", "12345678"));

    let (status, first) = app
        .json(Method::POST, "/api/guests", Some(&staff), json!({ "email": "guest@campus.ac.id" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, second) = app
        .json(Method::POST, "/api/guests", Some(&staff), json!({ "email": "guest@campus.ac.id" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(second["success"], false);
    assert_eq!(second["data"]["id"], first["data"]["id"]);
    assert_eq!(app.store.guest_logs().len(), 1);

    let (status, page) = app.get("/api/guests?page=1&limit=10", Some(&staff)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 1);
    assert_eq!(page["meta"]["limit"], 10);
}

#[tokio::test]
async fn campus_directory_lists_people_for_staff() {
    let app = TestApp::new();
    let staff = app.token_for(Role::Staff);
    let mut guest = student_identity("guest@campus.ac.id", "12345678");
    guest.major = Some("Informatika".into());
    app.gateway.insert(guest);

    let (status, body) = app.get("/api/guests/campus", Some(&staff)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["full_name"], "Rizqi Noor Fauzan");
    assert_eq!(body["data"][0]["nim"], "12345678");
    assert_eq!(body["data"][0]["prodi"], "Informatika");

    let student = app.token_for(Role::Student);
    let (status, _) = app.get("/api/guests/campus", Some(&student)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn guest_lookup_timeout_is_bad_request() {
    let app = TestApp::new();
    let staff = app.token_for(Role::Staff);
    app.gateway.fail_with(library_core::GatewayError::UpstreamTimeout);

    let (status, body) = app
        .json(Method::POST, "/api/guests", Some(&staff), json!({ "email": "guest@campus.ac.id" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Campus API request timeout");
}

#[tokio::test]
async fn login_syncs_and_returns_token() {
    let app = TestApp::new();
    app.gateway.insert(student_identity("rizqi@campus.ac.id", "12345678"));

    let (status, body) = app
        .json(Method::POST, "/api/auth/google-callback", None, json!({ "email": "rizqi@campus.ac.id" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["localUser"]["user"]["email"], "rizqi@campus.ac.id");
    let token = body["data"]["accessToken"].as_str().unwrap().to_string();

    let (status, me) = app.get("/api/members/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["nimNidn"], "12345678");
}

#[tokio::test]
async fn login_for_unknown_campus_user_is_unauthorized() {
    let app = TestApp::new();
    let (status, body) = app
        .json(Method::POST, "/api/auth/google-callback", None, json!({ "email": "ghost@campus.ac.id" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn login_is_rate_limited() {
    let app = TestApp::with_auth_limit(1);
    let payload = json!({ "email": "ghost@campus.ac.id" });

    let (first, _) = app.json(Method::POST, "/api/auth/google-callback", None, payload.clone()).await;
    assert_eq!(first, StatusCode::UNAUTHORIZED);

    let (second, body) = app.json(Method::POST, "/api/auth/google-callback", None, payload).await;
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn blacklisted_token_is_forbidden() {
    let app = TestApp::new();
    let token = app.token_for(Role::Staff);
    let mut user = app.store.users().pop().unwrap();
    user.status = UserStatus::Blacklist;
    app.store.set_user(user);

    let (status, _) = app.get("/api/guests", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_super_admin_manages_users() {
    let app = TestApp::new();
    let staff = app.token_for(Role::Staff);
    let admin = app.token_for(Role::SuperAdmin);

    let (status, _) = app.get("/api/auth/users", Some(&staff)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let staff_id = app
        .store
        .users()
        .into_iter()
        .find(|u| u.role == Role::Staff)
        .unwrap()
        .id;
    let (status, body) = app
        .json(
            Method::PATCH,
            &format!("/api/auth/users/{}", staff_id),
            Some(&admin),
            json!({ "role": "lecturer" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "lecturer");
}
