// ==========================================
// 优惠券预约系统 - 预约配置读取 Trait
// ==========================================
// 职责: 定义引擎/调度所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveTime};
use std::time::Duration;

// ==========================================
// ReservationConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ReservationConfigReader: Send + Sync {
    // ===== 预约窗口 =====

    /// 预约窗口开放时刻（本地时间）
    ///
    /// # 默认值
    /// - 22:55
    async fn get_window_open(&self) -> ConfigResult<NaiveTime>;

    /// 预约窗口关闭时刻（本地时间）
    ///
    /// # 默认值
    /// - None（开放至本地零点）
    async fn get_window_close(&self) -> ConfigResult<Option<NaiveTime>>;

    /// 预约窗口所在时区
    ///
    /// # 默认值
    /// - UTC+8
    async fn get_utc_offset(&self) -> ConfigResult<FixedOffset>;

    // ===== 活动调度 =====

    /// 每日创建活动的本地时刻
    ///
    /// # 默认值
    /// - 22:30
    async fn get_campaign_create_time(&self) -> ConfigResult<NaiveTime>;

    // ===== 存储 =====

    /// 单次存储调用超时
    ///
    /// # 默认值
    /// - 3000ms
    async fn get_storage_timeout(&self) -> ConfigResult<Duration>;

    /// 预约是否必须引用已存在的活动
    ///
    /// # 默认值
    /// - true
    async fn get_enforce_campaign_exists(&self) -> ConfigResult<bool>;
}
