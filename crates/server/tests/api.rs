use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::router(engine)
}

fn basic_auth(email: &str, password: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{email}:{password}"));
    format!("Basic {encoded}")
}

async fn register(app: &Router, email: &str, name: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"email": email, "name": name, "password": "password"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let user: Value = serde_json::from_slice(&body).unwrap();
    user["id"].as_str().unwrap().to_string()
}

async fn post_expense(app: &Router, auth: &str, payload: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/expenses")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, auth)
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn register_then_create_equal_expense() {
    let app = app().await;
    let alice = register(&app, "alice@example.com", "Alice").await;
    let bob = register(&app, "bob@example.com", "Bob").await;

    let auth = basic_auth("alice@example.com", "password");
    let (status, expense) = post_expense(
        &app,
        &auth,
        json!({
            "description": "Dinner",
            "total_amount": "100.00",
            "split_method": "equal",
            "participants": [alice, bob],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["split_method"], "equal");
    assert_eq!(expense["total_amount"], "100.00");
    let participants = expense["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 2);
    assert_eq!(participants[0]["amount_owed"], "50.00");
    assert_eq!(participants[1]["amount_owed"], "50.00");
    assert_eq!(expense["created_by"], Value::String(alice));
}

#[tokio::test]
async fn percentage_not_summing_to_hundred_is_unprocessable() {
    let app = app().await;
    let alice = register(&app, "alice@example.com", "Alice").await;
    let bob = register(&app, "bob@example.com", "Bob").await;

    let auth = basic_auth("alice@example.com", "password");
    let (status, body) = post_expense(
        &app,
        &auth,
        json!({
            "description": "Groceries",
            "total_amount": "90.00",
            "split_method": "percentage",
            "participants": [
                {"user_id": alice, "percentage": "50"},
                {"user_id": bob, "percentage": "40"},
            ],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("100"));
}

#[tokio::test]
async fn unknown_participant_is_not_found() {
    let app = app().await;
    let alice = register(&app, "alice@example.com", "Alice").await;

    let auth = basic_auth("alice@example.com", "password");
    let ghost = uuid::Uuid::new_v4().to_string();
    let (status, _) = post_expense(
        &app,
        &auth,
        json!({
            "description": "Dinner",
            "total_amount": "50.00",
            "split_method": "equal",
            "participants": [alice, ghost],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app().await;
    register(&app, "alice@example.com", "Alice").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"email": "alice@example.com", "name": "Twin", "password": "password"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn protected_routes_require_credentials() {
    let app = app().await;
    register(&app, "alice@example.com", "Alice").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/expenses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/expenses")
                .header(
                    header::AUTHORIZATION,
                    basic_auth("alice@example.com", "wrong"),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn database_failure_during_auth_is_a_server_error() {
    // No migrations: the users table is missing, so the credential lookup
    // fails with a database error rather than a credential mismatch.
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let app = server::router(engine);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/expenses")
                .header(
                    header::AUTHORIZATION,
                    basic_auth("alice@example.com", "password"),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn balance_sheet_csv_matches_expected_layout() {
    let app = app().await;
    let alice = register(&app, "alice@example.com", "Alice").await;
    let bob = register(&app, "bob@example.com", "Bob").await;

    let auth = basic_auth("alice@example.com", "password");
    let (status, expense) = post_expense(
        &app,
        &auth,
        json!({
            "description": "Groceries",
            "total_amount": "100.00",
            "split_method": "percentage",
            "participants": [
                {"user_id": alice, "percentage": "60"},
                {"user_id": bob, "percentage": "40"},
            ],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let expense_id = expense["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/users/{alice}/balance/csv"))
                .header(header::AUTHORIZATION, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"balance_sheet_user_{alice}.csv\"")
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Expense ID,Description,Total Amount,Split Method,Amount Owed")
    );
    assert_eq!(
        lines.next(),
        Some(format!("{expense_id},Groceries,100.00,percentage,60.00").as_str())
    );
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn balance_sheet_json_reports_owed_amounts() {
    let app = app().await;
    let alice = register(&app, "alice@example.com", "Alice").await;
    let bob = register(&app, "bob@example.com", "Bob").await;

    let auth = basic_auth("bob@example.com", "password");
    let (status, _) = post_expense(
        &app,
        &auth,
        json!({
            "description": "Rent",
            "total_amount": "90.00",
            "split_method": "exact",
            "participants": [
                {"user_id": alice, "amount": "75.50"},
                {"user_id": bob, "amount": "14.50"},
            ],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/users/{bob}/balance"))
                .header(header::AUTHORIZATION, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let sheet: Value = serde_json::from_slice(&body).unwrap();
    let rows = sheet["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["amount_owed"], "14.50");
    assert_eq!(rows[0]["total_amount"], "90.00");
    assert_eq!(rows[0]["split_method"], "exact");
}
