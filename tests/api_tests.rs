mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use mypnl::db::trade_repo;
use mypnl::vendors::webhook_auth::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use mypnl::vendors::WebhookVerifier;

async fn body_json(resp: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn offline_app() -> axum::Router {
    common::build_test_app(common::unreachable_pool(), common::test_config())
}

async fn send(app: &axum::Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn edit_draft_row(app: &axum::Router, user: &str, row_id: &str, field: &str, value: &str) {
    let resp = send(
        app,
        as_user(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/drafts/rows/{row_id}"))
                .header("content-type", "application/json"),
            user,
        )
        .body(Body::from(json!({"field": field, "value": value}).to_string()))
        .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

/// Append a draft row and fill every required column.
async fn add_draft_trade(app: &axum::Router, user: &str, symbol: &str, pnl: &str) -> String {
    let resp = send(
        app,
        as_user(Request::builder().method("POST").uri("/api/drafts/rows"), user)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let row_id = body_json(resp).await["data"]["id"].as_str().unwrap().to_string();

    for (field, value) in [
        ("symbol", symbol),
        ("entry_price", "1.1000"),
        ("exit_price", "1.1050"),
        ("lot_size", "0.5"),
        ("pnl", pnl),
    ] {
        edit_draft_row(app, user, &row_id, field, value).await;
    }
    row_id
}

async fn get_draft(app: &axum::Router, user: &str) -> Value {
    let resp = send(
        app,
        as_user(Request::builder().uri("/api/drafts"), user)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    body_json(resp).await["data"].clone()
}

fn commit_request(user: &str) -> Request<Body> {
    as_user(Request::builder().method("POST").uri("/api/drafts/commit"), user)
        .body(Body::empty())
        .unwrap()
}

fn as_user(builder: axum::http::request::Builder, user: &str) -> axum::http::request::Builder {
    builder.header("x-user-id", user)
}

#[tokio::test]
async fn test_health_reports_missing_database() {
    let resp = offline_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["extraction"], false);
}

#[tokio::test]
async fn test_user_routes_require_identity() {
    let resp = offline_app()
        .oneshot(Request::builder().uri("/api/drafts").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_draft_rows_can_be_added_edited_and_removed() {
    let app = offline_app();

    let resp = app
        .clone()
        .oneshot(
            as_user(Request::builder().method("POST").uri("/api/drafts/rows"), "alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let row = body_json(resp).await["data"].clone();
    assert_eq!(row["trade_type"], "buy");
    let row_id = row["id"].as_str().unwrap().to_string();

    let resp = app
        .clone()
        .oneshot(
            as_user(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/api/drafts/rows/{row_id}"))
                    .header("content-type", "application/json"),
                "alice",
            )
            .body(Body::from(json!({"field": "symbol", "value": "XAUUSD"}).to_string()))
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let draft = body_json(resp).await["data"].clone();
    assert_eq!(draft["trades"][0]["symbol"], "XAUUSD");

    // another user's draft is separate
    let resp = app
        .clone()
        .oneshot(as_user(Request::builder().uri("/api/drafts"), "bob").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["data"]["trades"], json!([]));

    let resp = app
        .clone()
        .oneshot(
            as_user(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/drafts/rows/{row_id}")),
                "alice",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["trades"], json!([]));

    let resp = app
        .oneshot(
            as_user(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/drafts/rows/{row_id}")),
                "alice",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_extraction_unavailable_without_vendor_keys() {
    // the usage gate cannot reach the database and admits; extraction then reports itself off
    let resp = offline_app()
        .oneshot(
            as_user(
                Request::builder()
                    .method("POST")
                    .uri("/api/extract")
                    .header("content-type", "multipart/form-data; boundary=X"),
                "alice",
            )
            .body(Body::from("--X--\r\n"))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_payment_order_unavailable_without_gateway() {
    let resp = offline_app()
        .oneshot(
            as_user(
                Request::builder()
                    .method("POST")
                    .uri("/api/payments/orders")
                    .header("content-type", "application/json"),
                "alice",
            )
            .body(Body::from(json!({"plan": "monthly"}).to_string()))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_webhook_probe_answers() {
    let resp = offline_app()
        .oneshot(Request::builder().uri("/webhooks/payment").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_rejects_bad_signature() {
    let body = json!({"type": "PAYMENT_SUCCESS_WEBHOOK"}).to_string();

    let resp = offline_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/payment")
                .header(TIMESTAMP_HEADER, "1700000000")
                .header(SIGNATURE_HEADER, "bm90LWEtc2lnbmF0dXJl")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = offline_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/payment")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_refused_without_secret() {
    let mut config = common::test_config();
    config.gateway_webhook_secret = None;
    let app = common::build_test_app(common::unreachable_pool(), config);

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/payment")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_signed_non_paid_webhook_is_acknowledged_without_writes() {
    // the pool is unreachable, so any attempted write would fail the request
    let body = json!({
        "type": "ORDER_UPDATE",
        "data": {
            "order": { "order_id": "order_x", "order_status": "ACTIVE", "order_amount": 999 },
            "customer_details": { "customer_id": "u1" }
        }
    })
    .to_string();
    let signature = WebhookVerifier::new(common::WEBHOOK_SECRET)
        .sign("1700000000", body.as_bytes())
        .unwrap();

    let resp = offline_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/payment")
                .header(TIMESTAMP_HEADER, "1700000000")
                .header(SIGNATURE_HEADER, signature)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["result"], "ignored");
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let resp = offline_app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires Postgres at TEST_DATABASE_URL"]
async fn test_commit_keeps_draft_on_bad_row_then_clears_it() {
    let pool = common::setup_test_db().await;
    let app = common::build_test_app(pool.clone(), common::test_config());
    let user = common::unique_user();

    add_draft_trade(&app, &user, "EURUSD", "25").await;
    let bad_row = add_draft_trade(&app, &user, "GBPUSD", "12.5x").await;
    let before = get_draft(&app, &user).await;

    let resp = send(&app, commit_request(&user)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "row 2: pnl is not a number: '12.5x'");

    assert_eq!(get_draft(&app, &user).await, before);
    assert_eq!(trade_repo::count_trades_for_user(&pool, &user).await.unwrap(), 0);

    edit_draft_row(&app, &user, &bad_row, "pnl", "-12.5").await;

    let resp = send(&app, commit_request(&user)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["saved"], 2);

    assert_eq!(get_draft(&app, &user).await["trades"], json!([]));
    assert_eq!(trade_repo::count_trades_for_user(&pool, &user).await.unwrap(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore = "requires Postgres at TEST_DATABASE_URL"]
async fn test_concurrent_commits_save_rows_once() {
    let pool = common::setup_test_db().await;
    let app = common::build_test_app(pool.clone(), common::test_config());
    let user = common::unique_user();

    add_draft_trade(&app, &user, "EURUSD", "25").await;
    add_draft_trade(&app, &user, "XAUUSD", "-10").await;

    let first = tokio::spawn(app.clone().oneshot(commit_request(&user)));
    let second = tokio::spawn(app.clone().oneshot(commit_request(&user)));
    let statuses = [
        first.await.unwrap().unwrap().status(),
        second.await.unwrap().unwrap().status(),
    ];

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    // the loser either found a save running or an already emptied draft
    assert!(statuses.iter().all(|s| [
        StatusCode::OK,
        StatusCode::CONFLICT,
        StatusCode::UNPROCESSABLE_ENTITY
    ]
    .contains(s)));

    assert_eq!(trade_repo::count_trades_for_user(&pool, &user).await.unwrap(), 2);
    assert_eq!(get_draft(&app, &user).await["trades"], json!([]));
}

#[tokio::test]
#[ignore = "requires Postgres at TEST_DATABASE_URL"]
async fn test_manual_trade_accepts_numeric_json() {
    let pool = common::setup_test_db().await;
    let app = common::build_test_app(pool.clone(), common::test_config());
    let user = common::unique_user();

    let trade = json!({
        "symbol": "NAS100",
        "trade_type": "sell",
        "entry_price": 18250.5,
        "exit_price": 18200,
        "lot_size": 1,
        "pnl": 50,
        "trade_date": "2024-05-02"
    });
    let body = format!(
        "--X\r\nContent-Disposition: form-data; name=\"trade\"\r\n\r\n{trade}\r\n--X--\r\n"
    );

    let resp = send(
        &app,
        as_user(
            Request::builder()
                .method("POST")
                .uri("/api/trades")
                .header("content-type", "multipart/form-data; boundary=X"),
            &user,
        )
        .body(Body::from(body))
        .unwrap(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["symbol"], "NAS100");
    assert_eq!(trade_repo::count_trades_for_user(&pool, &user).await.unwrap(), 1);
}
