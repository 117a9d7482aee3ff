// ==========================================
// 优惠券预约系统 - 预约存储抽象
// ==========================================
// 职责: 定义引擎所需的存储接口（依赖倒置），并提供 SQLite 实现
// 红线: insert_reservation 必须是单次原子操作，唯一性由存储层保证
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::{Campaign, CampaignId, CouponReservation, InsertOutcome};
use crate::engine::error::{ReservationError, ReservationResult, StorageFailureCause};
use crate::repository::{
    CampaignRepository, CouponReservationRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use rusqlite::Connection;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==========================================
// ReservationStore Trait
// ==========================================
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// 追加新活动（ID 自增）
    async fn create_campaign(&self, created_at: i64) -> RepositoryResult<Campaign>;

    /// 最新活动（ID 最大者）
    async fn get_latest_campaign(&self) -> RepositoryResult<Option<Campaign>>;

    /// 按ID查询活动
    async fn get_campaign(&self, campaign_id: CampaignId) -> RepositoryResult<Option<Campaign>>;

    /// 原子插入预约；该组合已存在时返回 AlreadyExists
    async fn insert_reservation(
        &self,
        campaign_id: CampaignId,
        user_id: &str,
        coupon_code: &str,
        created_at: i64,
    ) -> RepositoryResult<InsertOutcome>;

    /// 按复合主键查询预约
    async fn get_reservation(
        &self,
        campaign_id: CampaignId,
        user_id: &str,
    ) -> RepositoryResult<Option<CouponReservation>>;
}

/// 带超时执行存储调用
///
/// 超时与存储错误统一归为 StorageFailure，不做重试
///
/// 注意: 超时后 spawn_blocking 中的写入仍会继续执行并可能已提交，不可假定未写入
pub(crate) async fn guarded<T, F>(
    timeout: Duration,
    operation: &'static str,
    context: String,
    fut: F,
) -> ReservationResult<T>
where
    F: Future<Output = RepositoryResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::error!(operation, %context, error = %e, "存储调用失败");
            Err(ReservationError::storage(operation, context, e))
        }
        Err(_) => {
            tracing::error!(operation, %context, ?timeout, "存储调用超时");
            Err(ReservationError::storage(
                operation,
                context,
                StorageFailureCause::Timeout(timeout),
            ))
        }
    }
}

/// 在阻塞线程池上执行同步仓储调用
async fn run_blocking<T, F>(f: F) -> RepositoryResult<T>
where
    F: FnOnce() -> RepositoryResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RepositoryError::InternalError(format!("存储任务执行失败: {}", e)))?
}

// ==========================================
// SqliteReservationStore - SQLite 实现
// ==========================================
/// 聚合活动仓储与预约仓储，向引擎提供异步接口
#[derive(Clone)]
pub struct SqliteReservationStore {
    campaign_repo: Arc<CampaignRepository>,
    reservation_repo: Arc<CouponReservationRepository>,
}

impl SqliteReservationStore {
    /// 从仓储创建
    pub fn new(
        campaign_repo: Arc<CampaignRepository>,
        reservation_repo: Arc<CouponReservationRepository>,
    ) -> Self {
        Self {
            campaign_repo,
            reservation_repo,
        }
    }

    /// 从共享连接创建（两个仓储共用同一连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self::new(
            Arc::new(CampaignRepository::new(conn.clone())),
            Arc::new(CouponReservationRepository::new(conn)),
        )
    }

    /// 打开数据库文件并建表
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    pub fn campaign_repo(&self) -> &Arc<CampaignRepository> {
        &self.campaign_repo
    }

    pub fn reservation_repo(&self) -> &Arc<CouponReservationRepository> {
        &self.reservation_repo
    }
}

#[async_trait]
impl ReservationStore for SqliteReservationStore {
    async fn create_campaign(&self, created_at: i64) -> RepositoryResult<Campaign> {
        let repo = self.campaign_repo.clone();
        run_blocking(move || repo.create(created_at)).await
    }

    async fn get_latest_campaign(&self) -> RepositoryResult<Option<Campaign>> {
        let repo = self.campaign_repo.clone();
        run_blocking(move || repo.find_latest()).await
    }

    async fn get_campaign(&self, campaign_id: CampaignId) -> RepositoryResult<Option<Campaign>> {
        let repo = self.campaign_repo.clone();
        run_blocking(move || repo.find_by_id(campaign_id)).await
    }

    async fn insert_reservation(
        &self,
        campaign_id: CampaignId,
        user_id: &str,
        coupon_code: &str,
        created_at: i64,
    ) -> RepositoryResult<InsertOutcome> {
        let repo = self.reservation_repo.clone();
        let user_id = user_id.to_string();
        let coupon_code = coupon_code.to_string();
        run_blocking(move || repo.insert_if_absent(campaign_id, &user_id, &coupon_code, created_at))
            .await
    }

    async fn get_reservation(
        &self,
        campaign_id: CampaignId,
        user_id: &str,
    ) -> RepositoryResult<Option<CouponReservation>> {
        let repo = self.reservation_repo.clone();
        let user_id = user_id.to_string();
        run_blocking(move || repo.find_by_key(campaign_id, &user_id)).await
    }
}
