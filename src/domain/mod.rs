// ==========================================
// 优惠券预约系统 - 领域模型层
// ==========================================
// 职责: 定义活动、预约实体与基础类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod campaign;
pub mod reservation;
pub mod types;

// 重导出核心类型
pub use campaign::Campaign;
pub use reservation::{CouponReservation, InsertOutcome};
pub use types::CampaignId;
