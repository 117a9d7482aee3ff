// ==========================================
// 优惠券预约系统 - 每日活动调度
// ==========================================
// 职责: 每天在配置的本地时刻触发 CampaignLifecycle::create_campaign
// 失败: 记录日志后等待下一周期，不重试
// 停止: watch 通道发送 true
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveTime, TimeZone, Utc};
use tokio::sync::watch;
use tracing::{error, info};

use crate::config::ReservationConfig;
use crate::engine::{CampaignLifecycle, Clock};

pub struct CampaignScheduler {
    lifecycle: Arc<CampaignLifecycle>,
    clock: Arc<dyn Clock>,
    trigger_time: NaiveTime,
    utc_offset: FixedOffset,
}

impl CampaignScheduler {
    pub fn new(
        lifecycle: Arc<CampaignLifecycle>,
        clock: Arc<dyn Clock>,
        trigger_time: NaiveTime,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            lifecycle,
            clock,
            trigger_time,
            utc_offset,
        }
    }

    /// 触发时刻取 campaign_create_time，时区与预约窗口一致
    pub fn from_config(
        lifecycle: Arc<CampaignLifecycle>,
        clock: Arc<dyn Clock>,
        config: &ReservationConfig,
    ) -> Self {
        Self::new(
            lifecycle,
            clock,
            config.campaign_create_time,
            config.window.utc_offset,
        )
    }

    /// 严格晚于 now 的下一个触发时刻
    pub fn next_trigger_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_now = now.with_timezone(&self.utc_offset).naive_local();
        let mut candidate = local_now.date().and_time(self.trigger_time);
        if candidate <= local_now {
            candidate += ChronoDuration::days(1);
        }
        let offset = ChronoDuration::seconds(i64::from(self.utc_offset.local_minus_utc()));
        Utc.from_utc_datetime(&(candidate - offset))
    }

    /// 运行调度循环直到收到停止信号
    ///
    /// # 返回
    /// - 成功创建的活动数
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> usize {
        let mut created = 0usize;
        info!(trigger_time = %self.trigger_time, utc_offset = %self.utc_offset, "活动调度已启动");

        while !*shutdown.borrow() {
            let now = self.clock.now();
            let next = self.next_trigger_after(now);
            let wait = (next - now).to_std().unwrap_or_default();

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    match self.lifecycle.create_campaign().await {
                        Ok(campaign) => {
                            created += 1;
                            info!(campaign_id = campaign.id, "定时创建活动成功");
                        }
                        Err(e) => {
                            error!(error = %e, "定时创建活动失败，等待下一周期");
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(created, "活动调度已停止");
        created
    }
}
