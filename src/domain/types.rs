// ==========================================
// 优惠券预约系统 - 领域类型定义
// ==========================================

/// 活动ID
///
/// 由存储层自增分配，从 1 开始；0 视为非法ID
pub type CampaignId = u64;
