// ==========================================
// 优惠券预约系统 - 活动领域模型
// ==========================================
// 红线: 活动创建后不可变更、不可删除
// 不变量: id 单调递增，最大 id 即"最新活动"
// ==========================================

use crate::domain::types::CampaignId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Campaign - 每日活动
// ==========================================
// 对齐: campaign 表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,  // 活动ID (自增)
    pub created_at: i64, // 创建时间 (UTC 秒级时间戳)
}

impl Campaign {
    /// 创建时间转为 UTC 时间（时间戳越界时返回 None）
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.created_at, 0)
    }
}
