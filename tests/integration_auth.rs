mod common;

use axum::http::StatusCode;
use common::{json_request, register_user, send, setup_test_app};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_register_and_login(pool: PgPool) {
    let app = setup_test_app(pool);
    let user = register_user(&app, "ada").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "ada@example.com", "password": "secret123" })),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user.id.to_string());
    assert!(body["token"].is_string());
    assert!(body["user"].get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_register_duplicate_email(pool: PgPool) {
    let app = setup_test_app(pool);
    register_user(&app, "ada").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "email": "ada@example.com",
                "username": "someone",
                "password": "secret123"
            })),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Duplicate entry");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_login_wrong_password(pool: PgPool) {
    let app = setup_test_app(pool);
    register_user(&app, "ada").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "ada@example.com", "password": "wrong-password" })),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_profile_upsert_and_fetch(pool: PgPool) {
    let app = setup_test_app(pool);
    let user = register_user(&app, "ada").await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/auth/profile",
            Some(json!({ "first_name": "Ada", "website": "https://ada.dev" })),
            Some(&user.token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ada");

    let (status, body) = send(
        &app,
        json_request("GET", "/api/auth/profile", None, Some(&user.token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ada");
    assert_eq!(body["profile"]["website"], "https://ada.dev");
    assert_eq!(body["counts"]["blogs"], 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_own_account(pool: PgPool) {
    let app = setup_test_app(pool);
    let user = register_user(&app, "ada").await;

    let (status, _) = send(
        &app,
        json_request(
            "DELETE",
            &format!("/api/users/{}", user.id),
            None,
            Some(&user.token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        json_request("GET", "/api/users/username/ada", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
