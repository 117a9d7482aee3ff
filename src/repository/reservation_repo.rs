// ==========================================
// 优惠券预约系统 - 预约数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 唯一性只由 (campaign_id, user_id) 主键 + 单条原子 INSERT 保证，
//       不允许"先查再写"
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::reservation::{CouponReservation, InsertOutcome};
use crate::domain::types::CampaignId;
use crate::repository::campaign_repo::{campaign_id_from_sql, campaign_id_to_sql};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

fn map_reservation_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CouponReservation> {
    Ok(CouponReservation {
        campaign_id: campaign_id_from_sql(0, row.get(0)?)?,
        user_id: row.get(1)?,
        coupon_code: row.get(2)?,
        created_at: row.get(3)?,
    })
}

// ==========================================
// CouponReservationRepository - 预约仓储
// ==========================================
/// 优惠券预约仓储
/// 职责: 管理 coupon_reservation 表（只插入，不更新、不删除）
pub struct CouponReservationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CouponReservationRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 按数据库路径创建仓储实例（独立连接）
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 原子插入预约（已存在则不写入）
    ///
    /// # 参数
    /// - `campaign_id`: 活动ID
    /// - `user_id`: 用户ID
    /// - `coupon_code`: 优惠券码（空串 = 未中签）
    /// - `created_at`: 写入时间 (UTC 秒级时间戳)
    ///
    /// # 返回
    /// - Ok(InsertOutcome::Created): 本次写入成功
    /// - Ok(InsertOutcome::AlreadyExists): 该组合已有预约，未写入
    /// - Err: 其他数据库错误（含非主键的约束违反）
    ///
    /// # 说明
    /// ON CONFLICT 只针对 (campaign_id, user_id) 主键；
    /// 多连接/多进程并发时由 SQLite 写锁 + 主键保证只有一行落库
    pub fn insert_if_absent(
        &self,
        campaign_id: CampaignId,
        user_id: &str,
        coupon_code: &str,
        created_at: i64,
    ) -> RepositoryResult<InsertOutcome> {
        let raw_campaign_id = campaign_id_to_sql(campaign_id)?;
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            INSERT INTO coupon_reservation (campaign_id, user_id, coupon_code, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (campaign_id, user_id) DO NOTHING
            "#,
            params![raw_campaign_id, user_id, coupon_code, created_at],
        )?;

        if changed == 0 {
            return Ok(InsertOutcome::AlreadyExists);
        }

        Ok(InsertOutcome::Created(CouponReservation {
            campaign_id,
            user_id: user_id.to_string(),
            coupon_code: coupon_code.to_string(),
            created_at,
        }))
    }

    /// 按复合主键查询
    ///
    /// # 返回
    /// - Ok(Some(CouponReservation)): 找到预约
    /// - Ok(None): 未找到
    /// - Err: 数据库错误
    pub fn find_by_key(
        &self,
        campaign_id: CampaignId,
        user_id: &str,
    ) -> RepositoryResult<Option<CouponReservation>> {
        let raw_campaign_id = campaign_id_to_sql(campaign_id)?;
        let conn = self.get_conn()?;
        let reservation = conn
            .query_row(
                r#"
                SELECT campaign_id, user_id, coupon_code, created_at
                FROM coupon_reservation
                WHERE campaign_id = ?1 AND user_id = ?2
                "#,
                params![raw_campaign_id, user_id],
                map_reservation_row,
            )
            .optional()?;
        Ok(reservation)
    }

    /// 查询活动下的全部预约（审计用，按写入时间、用户ID排序）
    pub fn find_by_campaign(&self, campaign_id: CampaignId) -> RepositoryResult<Vec<CouponReservation>> {
        let raw_campaign_id = campaign_id_to_sql(campaign_id)?;
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT campaign_id, user_id, coupon_code, created_at
            FROM coupon_reservation
            WHERE campaign_id = ?1
            ORDER BY created_at ASC, user_id ASC
            "#,
        )?;

        let reservations = stmt
            .query_map(params![raw_campaign_id], map_reservation_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(reservations)
    }

    /// 统计活动下的预约数
    pub fn count_by_campaign(&self, campaign_id: CampaignId) -> RepositoryResult<i64> {
        let raw_campaign_id = campaign_id_to_sql(campaign_id)?;
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM coupon_reservation WHERE campaign_id = ?1",
            params![raw_campaign_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}
