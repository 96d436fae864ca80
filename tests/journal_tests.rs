mod common;

use chrono::Utc;
use rust_decimal::Decimal;

use mypnl::access;
use mypnl::db::{subscription_repo, trade_repo};
use mypnl::extraction::PendingScreenshot;
use mypnl::journal::{TradeWriter, WriteError};
use mypnl::models::{PlanType, TradeInput};
use mypnl::storage::ScreenshotStore;

fn input(symbol: &str, pnl: &str) -> TradeInput {
    TradeInput {
        symbol: symbol.into(),
        trade_type: "buy".into(),
        entry_price: "1.1000".into(),
        exit_price: "1.1050".into(),
        lot_size: "0.5".into(),
        pnl: pnl.into(),
        trade_date: "2024-05-01".into(),
        ..TradeInput::default()
    }
}

fn writer(pool: &sqlx::PgPool, dir: &tempfile::TempDir) -> TradeWriter {
    TradeWriter::new(
        pool.clone(),
        ScreenshotStore::new(dir.path(), "http://localhost:8080"),
    )
}

#[tokio::test]
#[ignore = "requires Postgres at TEST_DATABASE_URL"]
async fn test_batch_with_bad_row_writes_nothing() {
    let pool = common::setup_test_db().await;
    let dir = tempfile::tempdir().unwrap();
    let user = common::unique_user();

    let rows = vec![input("EURUSD", "25"), input("GBPUSD", "12.5x")];
    let shot = PendingScreenshot {
        file_name: "shot.png".into(),
        bytes: b"png".to_vec(),
    };

    let err = writer(&pool, &dir)
        .commit_batch(&user, &rows, Some(&shot))
        .await
        .unwrap_err();

    match err {
        WriteError::Validation(v) => {
            assert_eq!(v.row, Some(2));
            assert_eq!(v.field, "pnl");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(trade_repo::count_trades_for_user(&pool, &user).await.unwrap(), 0);
    // validation runs before upload
    assert!(!dir.path().join("trade-screenshots").join(&user).exists());
}

#[tokio::test]
#[ignore = "requires Postgres at TEST_DATABASE_URL"]
async fn test_batch_shares_one_screenshot() {
    let pool = common::setup_test_db().await;
    let dir = tempfile::tempdir().unwrap();
    let user = common::unique_user();

    let rows = vec![input("EURUSD", "25"), input("XAUUSD", "-40.25")];
    let shot = PendingScreenshot {
        file_name: "shot.jpg".into(),
        bytes: b"jpg".to_vec(),
    };

    let saved = writer(&pool, &dir)
        .commit_batch(&user, &rows, Some(&shot))
        .await
        .unwrap();

    assert_eq!(saved.len(), 2);
    let url = saved[0].screenshot_url.clone().unwrap();
    assert!(url.ends_with(".jpg"));
    assert_eq!(saved[1].screenshot_url.as_deref(), Some(url.as_str()));
    assert_eq!(saved[1].pnl, Decimal::new(-4025, 2));
    assert_eq!(trade_repo::count_trades_for_user(&pool, &user).await.unwrap(), 2);
}

#[tokio::test]
#[ignore = "requires Postgres at TEST_DATABASE_URL"]
async fn test_update_keeps_chart_unless_replaced() {
    let pool = common::setup_test_db().await;
    let dir = tempfile::tempdir().unwrap();
    let user = common::unique_user();
    let w = writer(&pool, &dir);

    let trade = w.commit_single(&user, &input("EURUSD", "10"), None).await.unwrap();
    let chart = PendingScreenshot {
        file_name: "chart.png".into(),
        bytes: b"chart".to_vec(),
    };

    let updated = w
        .update(&user, trade.id, &input("EURUSD", "15"), Some(&chart))
        .await
        .unwrap();
    let chart_url = updated.strategy_chart_url.clone().unwrap();
    assert!(chart_url.contains("strategy-chart-"));

    let updated = w.update(&user, trade.id, &input("EURJPY", "20"), None).await.unwrap();
    assert_eq!(updated.symbol, "EURJPY");
    assert_eq!(updated.strategy_chart_url.as_deref(), Some(chart_url.as_str()));

    // someone else's trade is not found
    let err = w
        .update("someone_else", trade.id, &input("EURUSD", "1"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, WriteError::NotFound));
}

#[tokio::test]
#[ignore = "requires Postgres at TEST_DATABASE_URL"]
async fn test_gate_refuses_free_user_at_limit_until_upgraded() {
    let pool = common::setup_test_db().await;
    let dir = tempfile::tempdir().unwrap();
    let user = common::unique_user();
    let limit = 3;

    let rows: Vec<TradeInput> = (0..limit).map(|i| input("EURUSD", &i.to_string())).collect();
    writer(&pool, &dir).commit_batch(&user, &rows, None).await.unwrap();

    let decision = access::evaluate(&pool, &user, limit).await;
    assert_eq!(decision.uploads_count, limit);
    assert!(decision.has_reached_limit);
    assert!(!decision.admitted);

    let now = Utc::now();
    subscription_repo::upsert_subscription(&pool, &user, PlanType::Monthly, now, PlanType::Monthly.end_date_from(now))
        .await
        .unwrap();

    let decision = access::evaluate(&pool, &user, limit).await;
    assert!(decision.admitted);
    assert_eq!(decision.plan_type, PlanType::Monthly);
}
