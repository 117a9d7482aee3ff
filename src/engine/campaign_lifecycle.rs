// ==========================================
// 优惠券预约系统 - 活动生命周期
// ==========================================
// 职责: 创建新活动（由外部调度每日触发）
// 说明: 不做去重，重复触发由调度方负责
// ==========================================

use crate::domain::Campaign;
use crate::engine::clock::Clock;
use crate::engine::error::{context_of, ReservationResult};
use crate::engine::reservation::DEFAULT_STORAGE_TIMEOUT;
use crate::engine::store::{guarded, ReservationStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

pub struct CampaignLifecycle {
    store: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
    storage_timeout: Duration,
}

impl CampaignLifecycle {
    pub fn new(store: Arc<dyn ReservationStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    /// 创建活动（创建时间取注入时钟）
    #[instrument(skip(self))]
    pub async fn create_campaign(&self) -> ReservationResult<Campaign> {
        let created_at = self.clock.now().timestamp();
        let campaign = guarded(
            self.storage_timeout,
            "create_campaign",
            context_of(None, None),
            self.store.create_campaign(created_at),
        )
        .await?;

        info!(campaign_id = campaign.id, created_at, "活动已创建");
        Ok(campaign)
    }
}
