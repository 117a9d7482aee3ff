// ==========================================
// 优惠券预约系统 - 应用状态
// ==========================================
// 职责: 组装共享连接、配置、引擎与API实例
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::CampaignApi;
use crate::config::{ConfigManager, ReservationConfig};
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::{
    CampaignLifecycle, Clock, ReservationEngine, ReservationStore, SqliteReservationStore,
    SystemClock, UuidCouponCodeGenerator,
};

/// 应用状态
///
/// 所有组件共用同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 启动时加载的配置快照
    pub config: ReservationConfig,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 预约存储
    pub store: Arc<SqliteReservationStore>,

    /// 预约引擎
    pub engine: Arc<ReservationEngine>,

    /// 活动生命周期
    pub lifecycle: Arc<CampaignLifecycle>,

    /// 活动/预约 API
    pub campaign_api: Arc<CampaignApi>,
}

impl AppState {
    /// 创建新的AppState实例（系统时钟、UUID 券码）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Err(String): 打开数据库、建表或读取配置失败
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        Self::from_connection(db_path, conn, Arc::new(SystemClock)).await
    }

    /// 从已打开的连接创建（可注入时钟，便于测试）
    pub async fn from_connection(
        db_path: String,
        conn: Connection,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, String> {
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法初始化配置管理器: {}", e))?,
        );
        let config = ReservationConfig::load(config_manager.as_ref())
            .await
            .map_err(|e| format!("配置加载失败: {}", e))?;

        // ==========================================
        // 存储与引擎
        // ==========================================
        let store = Arc::new(SqliteReservationStore::from_connection(conn));
        let dyn_store: Arc<dyn ReservationStore> = store.clone();

        let engine = Arc::new(ReservationEngine::from_config(
            dyn_store.clone(),
            &config,
            Arc::new(UuidCouponCodeGenerator),
            clock.clone(),
        ));
        let lifecycle = Arc::new(
            CampaignLifecycle::new(dyn_store, clock).with_storage_timeout(config.storage_timeout),
        );

        let campaign_api = Arc::new(CampaignApi::new(engine.clone(), lifecycle.clone()));

        tracing::info!(?config, "AppState初始化完成");

        Ok(Self {
            db_path,
            config,
            config_manager,
            store,
            engine,
            lifecycle,
            campaign_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 COUPON_RESERVATION_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("COUPON_RESERVATION_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./coupon_reservation.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("coupon-reservation");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("coupon_reservation.db");
        }
    }

    path.to_string_lossy().to_string()
}
