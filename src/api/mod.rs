// ==========================================
// 优惠券预约系统 - API 层
// ==========================================
// 职责: 提供与传输无关的业务接口，供路由/命令层调用
// ==========================================

pub mod campaign_api;
pub mod error;

// 重导出核心类型
pub use campaign_api::{
    parse_campaign_id, CampaignApi, CampaignInfo, CouponReservationResponse,
    LatestCampaignResponse,
};
pub use error::{ApiError, ApiResult, ErrorResponse};
