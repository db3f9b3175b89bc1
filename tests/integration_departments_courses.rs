mod common;

use axum::http::StatusCode;
use common::{
    TEST_PASSWORD, create_test_account, create_test_course, create_test_department,
    create_test_teacher, generate_unique_code, generate_unique_email, get_auth_token,
    json_request, send, setup_test_app,
};
use schoolhouse::schoolhouse_models::Role;
use serde_json::json;
use sqlx::PgPool;

async fn teacher_token(pool: &PgPool) -> (axum::Router, String) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    create_test_account(&mut tx, &email, TEST_PASSWORD, Role::Teacher).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(app.clone(), &email, TEST_PASSWORD).await;
    (app, token)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_department_round_trip(pool: PgPool) {
    let (app, token) = teacher_token(&pool).await;

    let (status, created) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/departments",
            Some(&token),
            Some(json!({
                "name": "Computer Science",
                "code": "CS",
                "established_date": "1990-09-01",
                "description": "Algorithms and systems"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["code"], "CS");
    let id = created["id"].as_i64().unwrap();

    let uri = format!("/api/departments/{}", id);
    let (first_status, first) = send(app.clone(), json_request("GET", &uri, Some(&token), None)).await;
    let (second_status, second) = send(app, json_request("GET", &uri, Some(&token), None)).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first, created);
    assert_eq!(first, second);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_department_duplicate_code(pool: PgPool) {
    let (app, token) = teacher_token(&pool).await;

    let (status, _) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/departments",
            Some(&token),
            Some(json!({ "name": "Mathematics", "code": "MATH" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/departments",
            Some(&token),
            Some(json!({ "name": "Applied Mathematics", "code": "MATH" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "DUPLICATE_CONSTRAINT");
    assert_eq!(body["error"], "Department with code already exists: MATH");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_department_duplicate_name(pool: PgPool) {
    let (app, token) = teacher_token(&pool).await;

    let (status, _) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/departments",
            Some(&token),
            Some(json!({ "name": "Physics", "code": "PHY" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/departments",
            Some(&token),
            Some(json!({ "name": "Physics", "code": "PHYS" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "DUPLICATE_CONSTRAINT");
    assert_eq!(body["error"], "Department with name already exists: Physics");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM departments WHERE name = 'Physics'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_department_requires_authentication(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, _) = send(app, json_request("GET", "/api/departments", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_department_not_found(pool: PgPool) {
    let (app, token) = teacher_token(&pool).await;

    let (status, body) = send(
        app,
        json_request("GET", "/api/departments/999999", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Department not found with id: 999999");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_department_update_keeps_absent_fields(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let code = generate_unique_code("D");
    let id = create_test_department(&mut tx, &code).await;
    tx.commit().await.unwrap();

    let (app, token) = teacher_token(&pool).await;

    let (status, body) = send(
        app,
        json_request(
            "PUT",
            &format!("/api/departments/{}", id),
            Some(&token),
            Some(json!({ "description": "Renovated" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], code);
    assert_eq!(body["description"], "Renovated");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_department_list_paginates(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    for _ in 0..3 {
        create_test_department(&mut tx, &generate_unique_code("D")).await;
    }
    tx.commit().await.unwrap();

    let (app, token) = teacher_token(&pool).await;

    let (status, body) = send(
        app,
        json_request("GET", "/api/departments?limit=2", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["has_more"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_department_list_huge_page_is_empty(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    create_test_department(&mut tx, &generate_unique_code("D")).await;
    tx.commit().await.unwrap();

    let (app, token) = teacher_token(&pool).await;

    let (status, body) = send(
        app,
        json_request(
            "GET",
            "/api/departments?page=9223372036854775807&limit=100",
            Some(&token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["has_more"], false);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_department_delete_removes_student_logins(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let department_id = create_test_department(&mut tx, &generate_unique_code("D")).await;
    let teacher_email = generate_unique_email();
    create_test_teacher(&mut tx, &teacher_email, Some(department_id)).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(app.clone(), &teacher_email, TEST_PASSWORD).await;
    let student_email = generate_unique_email();

    let (status, _) = send(
        app.clone(),
        json_request(
            "POST",
            &format!("/api/teachers/{}/students", teacher_email),
            Some(&token),
            Some(json!({
                "first_name": "Alan",
                "last_name": "Turing",
                "email": student_email,
                "student_id": generate_unique_code("S"),
                "department_id": department_id,
                "password": "studentpass123"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        app,
        json_request(
            "DELETE",
            &format!("/api/departments/{}", department_id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE email = $1")
        .bind(&student_email)
        .fetch_one(&pool)
        .await
        .unwrap();
    let accounts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE email = $1")
        .bind(&student_email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(students, 0);
    assert_eq!(accounts, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_department_delete_cascades(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let department_id = create_test_department(&mut tx, &generate_unique_code("D")).await;
    let course_id = create_test_course(&mut tx, &generate_unique_code("C"), Some(department_id)).await;
    tx.commit().await.unwrap();

    let (app, token) = teacher_token(&pool).await;

    let (status, _) = send(
        app.clone(),
        json_request(
            "DELETE",
            &format!("/api/departments/{}", department_id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        app,
        json_request("GET", &format!("/api/courses/{}", course_id), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_keeps_department_code(pool: PgPool) {
    let (app, token) = teacher_token(&pool).await;

    let (status, department) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/departments",
            Some(&token),
            Some(json!({ "name": "Computer Science", "code": "CS" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, course) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/courses",
            Some(&token),
            Some(json!({
                "name": "Data Structures",
                "code": "CS201",
                "credits": 3,
                "department_id": department["id"]
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, fetched) = send(
        app,
        json_request("GET", &format!("/api/courses/{}", course["id"]), Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["department_code"], "CS");
    assert_eq!(fetched["department_id"], department["id"]);
    assert_eq!(fetched, course);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_course_with_department(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let department_code = generate_unique_code("D");
    let department_id = create_test_department(&mut tx, &department_code).await;
    tx.commit().await.unwrap();

    let (app, token) = teacher_token(&pool).await;

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/courses",
            Some(&token),
            Some(json!({
                "name": "Operating Systems",
                "code": "CS340",
                "credits": 4,
                "department_id": department_id
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], "CS340");
    assert_eq!(body["credits"], 4);
    assert_eq!(body["department_code"], department_code);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_course_unknown_department(pool: PgPool) {
    let (app, token) = teacher_token(&pool).await;

    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/api/courses",
            Some(&token),
            Some(json!({
                "name": "Compilers",
                "code": "CS450",
                "credits": 3,
                "department_id": 999999
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE code = 'CS450'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_course_duplicate_code(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let code = generate_unique_code("C");
    create_test_course(&mut tx, &code, None).await;
    tx.commit().await.unwrap();

    let (app, token) = teacher_token(&pool).await;

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/courses",
            Some(&token),
            Some(json!({ "name": "Another", "code": code, "credits": 2 })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("Course with code already exists: {}", code));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_list_filters_by_department(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let department_id = create_test_department(&mut tx, &generate_unique_code("D")).await;
    create_test_course(&mut tx, &generate_unique_code("C"), Some(department_id)).await;
    create_test_course(&mut tx, &generate_unique_code("C"), None).await;
    tx.commit().await.unwrap();

    let (app, token) = teacher_token(&pool).await;

    let (status, body) = send(
        app,
        json_request(
            "GET",
            &format!("/api/courses?department_id={}", department_id),
            Some(&token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["department_id"], department_id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_teacher_roster(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let course_id = create_test_course(&mut tx, &generate_unique_code("C"), None).await;
    let teacher_email = generate_unique_email();
    create_test_teacher(&mut tx, &teacher_email, None).await;
    tx.commit().await.unwrap();

    let teacher_id: i64 = sqlx::query_scalar("SELECT id FROM teachers WHERE email = $1")
        .bind(&teacher_email)
        .fetch_one(&pool)
        .await
        .unwrap();

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(app.clone(), &teacher_email, TEST_PASSWORD).await;

    let assign_uri = format!("/api/teachers/{}/courses/{}", teacher_id, course_id);
    for _ in 0..2 {
        let (status, _) = send(app.clone(), json_request("POST", &assign_uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (status, body) = send(
        app.clone(),
        json_request(
            "GET",
            &format!("/api/courses/{}/teachers", course_id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let roster = body.as_array().unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0]["email"], teacher_email);

    let (status, _) = send(app.clone(), json_request("DELETE", &assign_uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(
        app,
        json_request(
            "GET",
            &format!("/api/courses/{}/teachers", course_id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert!(body.as_array().unwrap().is_empty());
}
