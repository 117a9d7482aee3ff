// ==========================================
// 并发预约测试
// ==========================================
// 测试目标: 同一 (campaign_id, user_id) 并发预约只落一行，
//           所有调用方拿到相同券码
// ==========================================


use coupon_reservation::engine::{
    AllocationRule, EligibilityGate, FixedClock, ReservationEngine, SqliteReservationStore,
};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use test_helpers::*;

const CALLERS: usize = 32;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_pair_shared_connection() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let ctx = build_context(&db_path);
    ctx.lifecycle.create_campaign().await.unwrap();

    let tasks = (0..CALLERS).map(|_| {
        let engine = ctx.engine.clone();
        tokio::spawn(async move { engine.reserve_coupon(1, "user_id_4", window_open()).await })
    });

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let codes: HashSet<_> = results.iter().map(|r| r.coupon_code.clone()).collect();
    assert_eq!(codes.len(), 1);
    assert!(!results[0].coupon_code.is_empty());
    assert_eq!(ctx.store.reservation_repo().count_by_campaign(1).unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_pair_separate_connections() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let ctx = build_context(&db_path);
    ctx.lifecycle.create_campaign().await.unwrap();

    // 每个调用方使用独立连接，唯一性只能由数据库约束保证
    let engines: Vec<Arc<ReservationEngine>> = (0..8)
        .map(|_| {
            let store = Arc::new(SqliteReservationStore::open(&db_path).unwrap());
            Arc::new(ReservationEngine::new(
                store,
                EligibilityGate::default(),
                AllocationRule::default(),
                Arc::new(FixedClock::new(window_open())),
            ))
        })
        .collect();

    let tasks = (0..CALLERS).map(|i| {
        let engine = engines[i % engines.len()].clone();
        tokio::spawn(async move { engine.reserve_coupon(1, "user_id_4", window_open()).await })
    });

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let codes: HashSet<_> = results.iter().map(|r| r.coupon_code.clone()).collect();
    assert_eq!(codes.len(), 1, "所有调用方应拿到同一券码");

    let stored = ctx
        .store
        .reservation_repo()
        .find_by_key(1, "user_id_4")
        .unwrap()
        .unwrap();
    assert!(codes.contains(&stored.coupon_code));
    assert_eq!(ctx.store.reservation_repo().count_by_campaign(1).unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_users() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let ctx = build_context(&db_path);
    ctx.lifecycle.create_campaign().await.unwrap();

    let tasks = (0..CALLERS).map(|i| {
        let engine = ctx.engine.clone();
        tokio::spawn(async move {
            let user_id = format!("user_id_{}", i);
            engine.reserve_coupon(1, &user_id, window_open()).await
        })
    });

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let winners = results.iter().filter(|r| r.has_coupon()).count();
    let expected = (0..CALLERS)
        .filter(|i| AllocationRule::is_winner(1, &format!("user_id_{}", i)))
        .count();
    assert_eq!(winners, expected);
    assert_eq!(ctx.generator.calls(), expected);
    assert_eq!(
        ctx.store.reservation_repo().count_by_campaign(1).unwrap() as usize,
        CALLERS
    );
}
