mod common;

use axum::http::StatusCode;
use common::{
    TEST_PASSWORD, create_test_account, create_test_department, generate_unique_code,
    generate_unique_email, get_auth_token, json_request, send, setup_test_app,
};
use schoolhouse::schoolhouse_models::Role;
use serde_json::{Value, json};
use sqlx::PgPool;

async fn authenticated_app(pool: &PgPool) -> (axum::Router, String) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    create_test_account(&mut tx, &email, TEST_PASSWORD, Role::Teacher).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(app.clone(), &email, TEST_PASSWORD).await;
    (app, token)
}

fn teacher_body(email: &str, department_id: Option<i64>) -> Value {
    json!({
        "first_name": "Barbara",
        "last_name": "Liskov",
        "email": email,
        "teacher_id": generate_unique_code("T"),
        "hire_date": "2001-08-15",
        "specialization": "Programming languages",
        "department_id": department_id
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_and_get_teacher(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let department_id = create_test_department(&mut tx, &generate_unique_code("D")).await;
    tx.commit().await.unwrap();

    let (app, token) = authenticated_app(&pool).await;
    let email = generate_unique_email();

    let (status, created) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/teachers",
            Some(&token),
            Some(teacher_body(&email, Some(department_id))),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], email);
    assert_eq!(created["department_id"], department_id);
    assert!(created["department_name"].is_string());

    let (status, fetched) = send(
        app,
        json_request(
            "GET",
            &format!("/api/teachers/{}", created["id"]),
            Some(&token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_teacher_duplicate_email(pool: PgPool) {
    let (app, token) = authenticated_app(&pool).await;
    let email = generate_unique_email();

    let (status, _) = send(
        app.clone(),
        json_request("POST", "/api/teachers", Some(&token), Some(teacher_body(&email, None))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request("POST", "/api/teachers", Some(&token), Some(teacher_body(&email, None))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "DUPLICATE_CONSTRAINT");
    assert_eq!(body["error"], format!("Teacher with email already exists: {}", email));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_teacher_unknown_department(pool: PgPool) {
    let (app, token) = authenticated_app(&pool).await;
    let email = generate_unique_email();

    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/api/teachers",
            Some(&token),
            Some(teacher_body(&email, Some(999999))),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teachers WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_teacher_rejects_bad_email(pool: PgPool) {
    let (app, token) = authenticated_app(&pool).await;

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/teachers",
            Some(&token),
            Some(teacher_body("not-an-email", None)),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "VALIDATION_FAILURE");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_teacher_keeps_identity(pool: PgPool) {
    let (app, token) = authenticated_app(&pool).await;
    let email = generate_unique_email();

    let (_, created) = send(
        app.clone(),
        json_request("POST", "/api/teachers", Some(&token), Some(teacher_body(&email, None))),
    )
    .await;

    let (status, updated) = send(
        app,
        json_request(
            "PUT",
            &format!("/api/teachers/{}", created["id"]),
            Some(&token),
            Some(json!({ "specialization": "Distributed systems" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["specialization"], "Distributed systems");
    assert_eq!(updated["email"], created["email"]);
    assert_eq!(updated["teacher_id"], created["teacher_id"]);
    assert_eq!(updated["first_name"], "Barbara");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_teacher(pool: PgPool) {
    let (app, token) = authenticated_app(&pool).await;

    let (_, created) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/teachers",
            Some(&token),
            Some(teacher_body(&generate_unique_email(), None)),
        ),
    )
    .await;
    let uri = format!("/api/teachers/{}", created["id"]);

    let (status, _) = send(app.clone(), json_request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(app.clone(), json_request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(app, json_request("GET", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_teachers_by_department(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let department_id = create_test_department(&mut tx, &generate_unique_code("D")).await;
    tx.commit().await.unwrap();

    let (app, token) = authenticated_app(&pool).await;

    for department in [Some(department_id), None] {
        let (status, _) = send(
            app.clone(),
            json_request(
                "POST",
                "/api/teachers",
                Some(&token),
                Some(teacher_body(&generate_unique_email(), department)),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        app,
        json_request(
            "GET",
            &format!("/api/teachers?department_id={}", department_id),
            Some(&token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["department_id"], department_id);
}
