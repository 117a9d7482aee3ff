// ==========================================
// 优惠券预约系统 - 预约引擎
// ==========================================
// 流程: Start → GateChecked → Allocated → Persisted → Done
//       提前退出: Rejected(NotReservationTime) / Failed(StorageFailure)
// 红线: 唯一性只依赖存储层原子插入，引擎不做"查后写"的唯一性判断
// 红线: 不重试；冲突失败方读取胜出方写入的记录
// ==========================================

use crate::config::ReservationConfig;
use crate::domain::{Campaign, CampaignId, CouponReservation, InsertOutcome};
use crate::engine::allocation::{AllocationRule, CouponCodeGenerator};
use crate::engine::clock::Clock;
use crate::engine::eligibility::{EligibilityGate, GateDecision};
use crate::engine::error::{context_of, ReservationError, ReservationResult};
use crate::engine::store::{guarded, ReservationStore};
use crate::repository::RepositoryError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// 默认存储调用超时
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_millis(3_000);

/// 活动ID上限（存储层为 SQLite INTEGER）
pub const MAX_CAMPAIGN_ID: CampaignId = i64::MAX as CampaignId;

/// 校验活动ID（0 为非法ID，自增ID从 1 开始，且不超过 MAX_CAMPAIGN_ID）
pub fn validate_campaign_id(campaign_id: CampaignId) -> ReservationResult<()> {
    if campaign_id == 0 {
        return Err(ReservationError::InvalidInput(
            "campaign_id 必须为正整数".to_string(),
        ));
    }
    if campaign_id > MAX_CAMPAIGN_ID {
        return Err(ReservationError::InvalidInput(format!(
            "campaign_id 超出范围: {}",
            campaign_id
        )));
    }
    Ok(())
}

/// 校验用户ID（不透明字符串，只要求非空白）
pub fn validate_user_id(user_id: &str) -> ReservationResult<()> {
    if user_id.trim().is_empty() {
        return Err(ReservationError::InvalidInput("user_id 不能为空".to_string()));
    }
    Ok(())
}

// ==========================================
// ReservationEngine - 预约引擎
// ==========================================
pub struct ReservationEngine {
    store: Arc<dyn ReservationStore>,
    gate: EligibilityGate,
    rule: AllocationRule,
    clock: Arc<dyn Clock>,
    storage_timeout: Duration,
    enforce_campaign_exists: bool,
}

impl ReservationEngine {
    /// 创建新的 ReservationEngine 实例
    ///
    /// # 参数
    /// - store: 预约存储
    /// - gate: 时间窗口准入
    /// - rule: 分配规则（含券码生成器）
    /// - clock: 时钟（仅 reserve_coupon_now 使用）
    pub fn new(
        store: Arc<dyn ReservationStore>,
        gate: EligibilityGate,
        rule: AllocationRule,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            gate,
            rule,
            clock,
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
            enforce_campaign_exists: true,
        }
    }

    /// 按配置快照创建
    pub fn from_config(
        store: Arc<dyn ReservationStore>,
        config: &ReservationConfig,
        generator: Arc<dyn CouponCodeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            store,
            EligibilityGate::new(config.window),
            AllocationRule::new(generator),
            clock,
        )
        .with_storage_timeout(config.storage_timeout)
        .with_campaign_check(config.enforce_campaign_exists)
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    /// 是否要求预约引用已存在的活动
    pub fn with_campaign_check(mut self, enforce: bool) -> Self {
        self.enforce_campaign_exists = enforce;
        self
    }

    pub fn gate(&self) -> &EligibilityGate {
        &self.gate
    }

    /// 预约优惠券
    ///
    /// # 参数
    /// - campaign_id: 活动ID
    /// - user_id: 用户ID
    /// - now: 当前时间（调用方注入）
    ///
    /// # 返回
    /// - Ok(CouponReservation): 新建或既有的预约（同一组合结果永远一致）
    /// - Err(NotReservationTime): 不在预约窗口
    /// - Err(CampaignNotFound): 活动不存在（严格模式）
    /// - Err(StorageFailure): 存储失败/超时
    /// - Err(InvalidInput): 非法参数
    #[instrument(skip(self))]
    pub async fn reserve_coupon(
        &self,
        campaign_id: CampaignId,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ReservationResult<CouponReservation> {
        // === 步骤 1: 参数校验 ===
        validate_campaign_id(campaign_id)?;
        validate_user_id(user_id)?;
        let ctx = context_of(Some(campaign_id), Some(user_id));

        // === 步骤 2: 时间窗口 ===
        if let GateDecision::Denied { local_time } = self.gate.check(now) {
            info!(%local_time, "非预约时间，拒绝预约");
            return Err(ReservationError::NotReservationTime {
                campaign_id,
                user_id: user_id.to_string(),
                local_time,
            });
        }

        // === 步骤 3: 活动存在性（活动不删除，此处读取不影响唯一性）===
        if self.enforce_campaign_exists {
            let campaign = guarded(
                self.storage_timeout,
                "get_campaign",
                ctx.clone(),
                self.store.get_campaign(campaign_id),
            )
            .await?;
            if campaign.is_none() {
                warn!("活动不存在，拒绝预约");
                return Err(ReservationError::CampaignNotFound { campaign_id });
            }
        }

        // === 步骤 4: 已有预约直接返回，不重新抽签 ===
        if let Some(existing) = guarded(
            self.storage_timeout,
            "get_reservation",
            ctx.clone(),
            self.store.get_reservation(campaign_id, user_id),
        )
        .await?
        {
            debug!("预约已存在，返回既有结果");
            return Ok(existing);
        }

        // === 步骤 5: 分配 ===
        let coupon_code = self.rule.decide(campaign_id, user_id);

        // === 步骤 6: 原子写入 ===
        let outcome = guarded(
            self.storage_timeout,
            "insert_reservation",
            ctx.clone(),
            self.store
                .insert_reservation(campaign_id, user_id, &coupon_code, now.timestamp()),
        )
        .await?;

        match outcome {
            InsertOutcome::Created(reservation) => {
                info!(has_coupon = reservation.has_coupon(), "预约已创建");
                Ok(reservation)
            }
            InsertOutcome::AlreadyExists => {
                // 并发冲突失败方: 读取胜出方写入的记录
                debug!("并发预约冲突，读取既有预约");
                let existing = guarded(
                    self.storage_timeout,
                    "get_reservation",
                    ctx.clone(),
                    self.store.get_reservation(campaign_id, user_id),
                )
                .await?;
                existing.ok_or_else(|| {
                    ReservationError::storage(
                        "get_reservation",
                        ctx,
                        RepositoryError::InternalError("插入冲突后未读到既有预约".to_string()),
                    )
                })
            }
        }
    }

    /// 以注入时钟的当前时间预约
    pub async fn reserve_coupon_now(
        &self,
        campaign_id: CampaignId,
        user_id: &str,
    ) -> ReservationResult<CouponReservation> {
        let now = self.clock.now();
        self.reserve_coupon(campaign_id, user_id, now).await
    }

    /// 查询预约（只读，不触发分配）
    #[instrument(skip(self))]
    pub async fn get_coupon_reservation(
        &self,
        campaign_id: CampaignId,
        user_id: &str,
    ) -> ReservationResult<CouponReservation> {
        validate_campaign_id(campaign_id)?;
        validate_user_id(user_id)?;

        guarded(
            self.storage_timeout,
            "get_reservation",
            context_of(Some(campaign_id), Some(user_id)),
            self.store.get_reservation(campaign_id, user_id),
        )
        .await?
        .ok_or_else(|| ReservationError::ReservationNotFound {
            campaign_id,
            user_id: user_id.to_string(),
        })
    }

    /// 查询最新活动
    ///
    /// # 返回
    /// - Err(NoCampaign): 尚无任何活动
    #[instrument(skip(self))]
    pub async fn get_latest_campaign(&self) -> ReservationResult<Campaign> {
        guarded(
            self.storage_timeout,
            "get_latest_campaign",
            context_of(None, None),
            self.store.get_latest_campaign(),
        )
        .await?
        .ok_or(ReservationError::NoCampaign)
    }

    /// 查询最新活动ID
    pub async fn get_latest_campaign_id(&self) -> ReservationResult<CampaignId> {
        Ok(self.get_latest_campaign().await?.id)
    }
}
