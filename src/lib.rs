// ==========================================
// 优惠券预约系统 - 核心库
// ==========================================
// 技术栈: Rust + Tokio + SQLite
// 系统定位: 每日活动优惠券预约（时间窗口准入 + 确定性分配 + 唯一预约）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组件装配与调度
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{Campaign, CampaignId, CouponReservation, InsertOutcome};

// 引擎
pub use engine::{
    AllocationRule, CampaignLifecycle, EligibilityGate, ReservationEngine, ReservationError,
    ReservationStore, ReservationWindow,
};

// API
pub use api::{ApiError, CampaignApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "优惠券预约系统";
