// ==========================================
// 优惠券预约系统 - 配置层
// ==========================================
// 职责: 系统配置管理（默认值 + config_kv 覆写）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod error;
pub mod reservation_config;
pub mod reservation_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use reservation_config::ReservationConfig;
pub use reservation_config_trait::ReservationConfigReader;
