// ==========================================
// 优惠券预约系统 - 主入口
// ==========================================
// 职责: 打开数据库、加载配置、运行每日活动调度直到 Ctrl-C
// ==========================================

use std::sync::Arc;

use anyhow::{anyhow, Context};
use coupon_reservation::app::{get_default_db_path, AppState, CampaignScheduler};
use coupon_reservation::engine::SystemClock;
use coupon_reservation::logging;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // COUPON_RESERVATION_LOG_FORMAT=json 时输出结构化日志
    match std::env::var("COUPON_RESERVATION_LOG_FORMAT") {
        Ok(format) if format.eq_ignore_ascii_case("json") => logging::init_json(),
        _ => logging::init(),
    }

    tracing::info!("==================================================");
    tracing::info!("{}", coupon_reservation::APP_NAME);
    tracing::info!("系统版本: {}", coupon_reservation::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path)
        .await
        .map_err(|e| anyhow!(e))
        .context("无法初始化AppState")?;

    let scheduler = CampaignScheduler::from_config(
        state.lifecycle.clone(),
        Arc::new(SystemClock),
        &state.config,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    tokio::signal::ctrl_c()
        .await
        .context("无法监听 Ctrl-C 信号")?;
    tracing::info!("收到停止信号，正在关闭...");

    shutdown_tx
        .send(true)
        .map_err(|_| anyhow!("调度任务已提前退出"))?;
    let created = runner.await.context("调度任务异常退出")?;

    tracing::info!(created, "已退出");
    Ok(())
}
