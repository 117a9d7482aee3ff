// ==========================================
// 优惠券预约系统 - 预约领域模型
// ==========================================
// 红线: 每个 (campaign_id, user_id) 至多一条预约
// 红线: 优惠券码一经写入永不变更，重复请求读取既有结果，不重新抽签
// ==========================================

use crate::domain::types::CampaignId;
use serde::{Deserialize, Serialize};

// ==========================================
// CouponReservation - 优惠券预约记录
// ==========================================
// 对齐: coupon_reservation 表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponReservation {
    // ===== 复合主键 =====
    pub campaign_id: CampaignId, // 活动ID
    pub user_id: String,         // 用户ID (调用方提供，不透明)

    // ===== 预约结果 =====
    pub coupon_code: String, // 优惠券码 (空串 = 未中签)

    // ===== 审计 =====
    pub created_at: i64, // 写入时间 (UTC 秒级时间戳)
}

impl CouponReservation {
    /// 是否抽中优惠券
    pub fn has_coupon(&self) -> bool {
        !self.coupon_code.is_empty()
    }
}

// ==========================================
// InsertOutcome - 原子插入结果
// ==========================================
// 用途: 区分"本次写入成功"与"该组合已存在"（唯一约束冲突，非错误）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(CouponReservation),
    AlreadyExists,
}
