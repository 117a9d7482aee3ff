// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 文件数据库上的活动/预约持久化与唯一约束
// ==========================================


use coupon_reservation::db;
use coupon_reservation::domain::InsertOutcome;
use coupon_reservation::repository::{CampaignRepository, CouponReservationRepository};
use test_helpers::*;

#[test]
fn test_schema_version_recorded() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = db::open_sqlite_connection(&db_path).unwrap();
    assert_eq!(
        db::read_schema_version(&conn).unwrap(),
        Some(db::CURRENT_SCHEMA_VERSION)
    );

    // 重复建表幂等
    db::init_schema(&conn).unwrap();
    assert_eq!(
        db::read_schema_version(&conn).unwrap(),
        Some(db::CURRENT_SCHEMA_VERSION)
    );
}

#[test]
fn test_campaign_ids_not_reused_across_connections() {
    let (_tmp, db_path) = create_test_db().unwrap();

    let repo_a = CampaignRepository::open(&db_path).unwrap();
    let repo_b = CampaignRepository::open(&db_path).unwrap();

    let c1 = repo_a.create(100).unwrap();
    let c2 = repo_b.create(200).unwrap();
    let c3 = repo_a.create(300).unwrap();

    assert!(c1.id < c2.id && c2.id < c3.id);
    assert_eq!(repo_b.find_latest().unwrap(), Some(c3));
    assert_eq!(repo_b.find_by_id(c1.id).unwrap(), Some(c1));
    assert_eq!(repo_a.count().unwrap(), 3);
}

#[test]
fn test_reservation_unique_across_connections() {
    let (_tmp, db_path) = create_test_db().unwrap();

    let repo_a = CouponReservationRepository::open(&db_path).unwrap();
    let repo_b = CouponReservationRepository::open(&db_path).unwrap();

    let first = repo_a.insert_if_absent(1, "user_id_4", "CODE-A", 10).unwrap();
    assert!(matches!(first, InsertOutcome::Created(_)));

    let second = repo_b.insert_if_absent(1, "user_id_4", "CODE-B", 20).unwrap();
    assert_eq!(second, InsertOutcome::AlreadyExists);

    let stored = repo_b.find_by_key(1, "user_id_4").unwrap().unwrap();
    assert_eq!(stored.coupon_code, "CODE-A");
    assert_eq!(stored.created_at, 10);

    // 同一用户在其他活动可以再次预约
    let other = repo_b.insert_if_absent(2, "user_id_4", "", 30).unwrap();
    assert!(matches!(other, InsertOutcome::Created(_)));
}

#[test]
fn test_find_by_campaign_ordered() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = CouponReservationRepository::open(&db_path).unwrap();

    repo.insert_if_absent(1, "b", "", 20).unwrap();
    repo.insert_if_absent(1, "a", "X", 20).unwrap();
    repo.insert_if_absent(1, "c", "", 10).unwrap();
    repo.insert_if_absent(2, "z", "", 5).unwrap();

    let users: Vec<String> = repo
        .find_by_campaign(1)
        .unwrap()
        .into_iter()
        .map(|r| r.user_id)
        .collect();
    assert_eq!(users, vec!["c", "a", "b"]);
    assert_eq!(repo.count_by_campaign(2).unwrap(), 1);
}
