// ==========================================
// CampaignApi 集成测试
// ==========================================
// 测试目标: 原始字符串入参、响应 DTO、错误状态码映射
// ==========================================


use coupon_reservation::api::{ApiError, CampaignApi};
use coupon_reservation::app::AppState;
use coupon_reservation::config::{config_keys, ConfigManager};
use coupon_reservation::engine::FixedClock;
use std::sync::Arc;
use test_helpers::*;

fn api(ctx: &TestContext) -> CampaignApi {
    CampaignApi::new(ctx.engine.clone(), ctx.lifecycle.clone())
}

#[tokio::test]
async fn test_api_happy_path() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let ctx = build_context(&db_path);
    let api = api(&ctx);

    let created = api.create_campaign().await.unwrap();
    assert_eq!(created.campaign_id, 1);
    assert_eq!(created.created_at, window_open().timestamp());

    let latest = api.get_latest_campaign().await.unwrap();
    assert_eq!(latest.latest_campaign_id, 1);

    let reserved = api.reserve_coupon("1", "user_id_4").await.unwrap();
    assert_eq!(reserved.campaign_id, 1);
    assert_eq!(reserved.user_id, "user_id_4");
    assert_eq!(reserved.coupon_code, "COUPON-0000");

    let fetched = api.get_reservation("1", "user_id_4").await.unwrap();
    assert_eq!(fetched, reserved);
}

#[tokio::test]
async fn test_api_error_status_codes() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let ctx = build_context(&db_path);
    let api = api(&ctx);

    // 尚无活动 → 404
    let err = api.get_latest_campaign().await.unwrap_err();
    assert_eq!(err.status_code(), 404);

    api.create_campaign().await.unwrap();

    // 非法活动ID → 400
    let err = api.reserve_coupon("-1", "user_id_4").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert_eq!(err.status_code(), 400);

    // 超出存储范围的活动ID → 400（非 500）
    let err = api
        .reserve_coupon_at("9223372036854775808", "user_id_4", window_open())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert_eq!(err.status_code(), 400);
    let err = api
        .get_reservation("9223372036854775808", "user_id_4")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    // 未预约 → 404
    let err = api.get_reservation("1", "nobody").await.unwrap_err();
    assert_eq!(err.status_code(), 404);

    // 非预约时间 → 403
    ctx.clock.set(taipei(2024, 8, 26, 22, 54));
    let err = api.reserve_coupon("1", "user_id_4").await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    assert_eq!(err.status_code(), 403);
    assert_eq!(err.to_response().code, "NOT_RESERVATION_TIME");

    // 窗口外时刻显式指定也同样拒绝
    let err = api
        .reserve_coupon_at("1", "user_id_4", taipei(2024, 8, 26, 9, 0))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_app_state_reads_config_overrides() {
    let (_tmp, db_path) = create_test_db().unwrap();

    // 窗口改为 09:00 开放、10:00 关闭
    let cm = ConfigManager::new(&db_path).unwrap();
    cm.set_config_value(config_keys::RESERVATION_WINDOW_OPEN, "09:00").unwrap();
    cm.set_config_value(config_keys::RESERVATION_WINDOW_CLOSE, "10:00").unwrap();
    drop(cm);

    let conn = coupon_reservation::db::open_sqlite_connection(&db_path).unwrap();
    let clock = Arc::new(FixedClock::new(taipei(2024, 8, 26, 9, 30)));
    let state = AppState::from_connection(db_path.clone(), conn, clock.clone())
        .await
        .unwrap();

    state.campaign_api.create_campaign().await.unwrap();
    assert!(state.campaign_api.reserve_coupon("1", "user_id_4").await.is_ok());

    // 默认开放时刻 22:55 此时不在窗口内
    clock.set(window_open());
    let err = state
        .campaign_api
        .reserve_coupon("1", "user_id_1")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
}
