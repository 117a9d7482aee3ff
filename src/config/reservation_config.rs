// ==========================================
// 优惠券预约系统 - 预约配置快照
// ==========================================
// 职责: 启动时一次性读取配置，供引擎与调度使用
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::reservation_config_trait::ReservationConfigReader;
use crate::engine::eligibility::ReservationWindow;
use crate::engine::reservation::DEFAULT_STORAGE_TIMEOUT;
use chrono::NaiveTime;
use std::time::Duration;

/// 预约配置（不可变快照）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationConfig {
    pub window: ReservationWindow,
    pub campaign_create_time: NaiveTime,
    pub storage_timeout: Duration,
    pub enforce_campaign_exists: bool,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            window: ReservationWindow::default(),
            campaign_create_time: NaiveTime::from_hms_opt(22, 30, 0).unwrap_or(NaiveTime::MIN),
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
            enforce_campaign_exists: true,
        }
    }
}

impl ReservationConfig {
    /// 从配置读取器加载
    ///
    /// # 返回
    /// - Err: 任一配置值非法
    pub async fn load<R: ReservationConfigReader + ?Sized>(reader: &R) -> ConfigResult<Self> {
        let window = ReservationWindow::new(
            reader.get_window_open().await?,
            reader.get_window_close().await?,
            reader.get_utc_offset().await?,
        );

        let config = Self {
            window,
            campaign_create_time: reader.get_campaign_create_time().await?,
            storage_timeout: reader.get_storage_timeout().await?,
            enforce_campaign_exists: reader.get_enforce_campaign_exists().await?,
        };
        tracing::debug!(?config, "预约配置已加载");
        Ok(config)
    }
}
