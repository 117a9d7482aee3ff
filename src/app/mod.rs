// ==========================================
// 优惠券预约系统 - 应用层
// ==========================================
// 职责: 组件装配与每日活动调度
// ==========================================

pub mod scheduler;
pub mod state;

// 重导出
pub use scheduler::CampaignScheduler;
pub use state::{get_default_db_path, AppState};
