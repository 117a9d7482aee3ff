// ==========================================
// 优惠券预约系统 - 活动/预约 API
// ==========================================
// 职责: 面向路由层的窄接口，接受原始字符串活动ID，
//       返回可序列化的响应 DTO
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{Campaign, CampaignId, CouponReservation};
use crate::engine::{CampaignLifecycle, ReservationEngine};

// ==========================================
// 响应 DTO
// ==========================================

/// 最新活动响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestCampaignResponse {
    pub latest_campaign_id: CampaignId,
}

/// 活动创建响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignInfo {
    pub campaign_id: CampaignId,
    pub created_at: i64,
}

impl From<Campaign> for CampaignInfo {
    fn from(c: Campaign) -> Self {
        Self {
            campaign_id: c.id,
            created_at: c.created_at,
        }
    }
}

/// 预约响应（未中奖时 coupon_code 为空串）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponReservationResponse {
    pub campaign_id: CampaignId,
    pub user_id: String,
    pub coupon_code: String,
}

impl From<CouponReservation> for CouponReservationResponse {
    fn from(r: CouponReservation) -> Self {
        Self {
            campaign_id: r.campaign_id,
            user_id: r.user_id,
            coupon_code: r.coupon_code,
        }
    }
}

/// 解析路由传入的活动ID
///
/// # 返回
/// - Err(InvalidInput): 非数字、负数或 0
pub fn parse_campaign_id(raw: &str) -> ApiResult<CampaignId> {
    let trimmed = raw.trim();
    match trimmed.parse::<CampaignId>() {
        Ok(0) | Err(_) => Err(ApiError::InvalidInput(format!(
            "无效的活动ID: campaign_id={}",
            raw
        ))),
        Ok(id) => Ok(id),
    }
}

// ==========================================
// CampaignApi
// ==========================================
pub struct CampaignApi {
    engine: Arc<ReservationEngine>,
    lifecycle: Arc<CampaignLifecycle>,
}

impl CampaignApi {
    pub fn new(engine: Arc<ReservationEngine>, lifecycle: Arc<CampaignLifecycle>) -> Self {
        Self { engine, lifecycle }
    }

    /// 创建活动
    pub async fn create_campaign(&self) -> ApiResult<CampaignInfo> {
        Ok(self.lifecycle.create_campaign().await?.into())
    }

    /// 查询最新活动ID
    ///
    /// # 返回
    /// - Err(NotFound): 尚无任何活动
    pub async fn get_latest_campaign(&self) -> ApiResult<LatestCampaignResponse> {
        let latest_campaign_id = self.engine.get_latest_campaign_id().await?;
        Ok(LatestCampaignResponse { latest_campaign_id })
    }

    /// 预约优惠券（时间取引擎注入时钟）
    ///
    /// # 参数
    /// - raw_campaign_id: 路由传入的活动ID
    /// - user_id: 用户ID
    pub async fn reserve_coupon(
        &self,
        raw_campaign_id: &str,
        user_id: &str,
    ) -> ApiResult<CouponReservationResponse> {
        let campaign_id = parse_campaign_id(raw_campaign_id)?;
        let reservation = self.engine.reserve_coupon_now(campaign_id, user_id).await?;
        Ok(reservation.into())
    }

    /// 预约优惠券（显式指定当前时间）
    pub async fn reserve_coupon_at(
        &self,
        raw_campaign_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ApiResult<CouponReservationResponse> {
        let campaign_id = parse_campaign_id(raw_campaign_id)?;
        let reservation = self.engine.reserve_coupon(campaign_id, user_id, now).await?;
        Ok(reservation.into())
    }

    /// 查询预约
    pub async fn get_reservation(
        &self,
        raw_campaign_id: &str,
        user_id: &str,
    ) -> ApiResult<CouponReservationResponse> {
        let campaign_id = parse_campaign_id(raw_campaign_id)?;
        let reservation = self
            .engine
            .get_coupon_reservation(campaign_id, user_id)
            .await?;
        Ok(reservation.into())
    }
}
