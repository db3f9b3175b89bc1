use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use schoolhouse::config::{CorsConfig, JwtConfig, RateLimitConfig};
use schoolhouse::router::init_router;
use schoolhouse::schoolhouse_core::hash_password;
use schoolhouse::schoolhouse_models::Role;
use schoolhouse::state::AppState;
use serde_json::{Value, json};
#[allow(unused_imports)]
use sqlx::{PgPool, Postgres, Transaction};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "testpass123";

#[allow(dead_code)]
pub struct TestAccount {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Inserts a login account directly, bypassing registration.
pub async fn create_test_account(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
    role: Role,
) -> TestAccount {
    let hashed = hash_password(password).unwrap();

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO accounts (first_name, last_name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind("Test")
    .bind("Account")
    .bind(email)
    .bind(hashed)
    .bind(role)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestAccount {
        id,
        email: email.to_string(),
        password: password.to_string(),
        role,
    }
}

#[allow(dead_code)]
pub async fn create_test_department(tx: &mut Transaction<'_, Postgres>, code: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO departments (name, code)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(format!("Department {}", code))
    .bind(code)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_course(
    tx: &mut Transaction<'_, Postgres>,
    code: &str,
    department_id: Option<i64>,
) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO courses (name, code, credits, department_id)
        VALUES ($1, $2, 3, $3)
        RETURNING id
        "#,
    )
    .bind(format!("Course {}", code))
    .bind(code)
    .bind(department_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

/// A TEACHER account plus the matching teacher profile.
#[allow(dead_code)]
pub async fn create_test_teacher(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    department_id: Option<i64>,
) -> TestAccount {
    let account = create_test_account(tx, email, TEST_PASSWORD, Role::Teacher).await;

    sqlx::query(
        r#"
        INSERT INTO teachers (first_name, last_name, email, teacher_id, department_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind("Test")
    .bind("Teacher")
    .bind(email)
    .bind(generate_unique_code("T"))
    .bind(department_id)
    .execute(&mut **tx)
    .await
    .unwrap();

    account
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

/// Short unique code that fits the narrow code columns.
#[allow(dead_code)]
pub fn generate_unique_code(prefix: &str) -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("{}{}", prefix, &simple[..6])
}

#[allow(dead_code)]
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-key-at-least-32-characters-long".to_string(),
        access_token_expiry: 3600,
    }
}

#[allow(dead_code)]
pub fn setup_test_app_with_rate_limit(
    pool: PgPool,
    rate_limit_config: RateLimitConfig,
) -> axum::Router {
    let state = AppState {
        db: pool,
        jwt_config: test_jwt_config(),
        cors_config: CorsConfig::from_list("http://localhost:3000"),
        rate_limit_config,
    };
    init_router(state)
}

#[allow(dead_code)]
pub fn setup_test_app(pool: PgPool) -> axum::Router {
    setup_test_app_with_rate_limit(pool, RateLimitConfig::disabled())
}

#[allow(dead_code)]
pub async fn get_auth_token(app: axum::Router, email: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": password
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

/// Builds a JSON request, authenticated when `token` is given.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let body = match body {
        Some(value) => Body::from(serde_json::to_string(&value).unwrap()),
        None => Body::empty(),
    };

    builder.body(body).unwrap()
}

/// Sends `request` and returns the status with the parsed body (`Null` when empty).
#[allow(dead_code)]
pub async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
