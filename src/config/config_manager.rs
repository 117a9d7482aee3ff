// ==========================================
// 优惠券预约系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::reservation_config_trait::ReservationConfigReader;
use crate::db::open_sqlite_connection;
use crate::engine::eligibility::offset_from_minutes;
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 预约窗口
    pub const RESERVATION_WINDOW_OPEN: &str = "reservation_window_open";
    pub const RESERVATION_WINDOW_CLOSE: &str = "reservation_window_close";
    pub const RESERVATION_UTC_OFFSET_MINUTES: &str = "reservation_utc_offset_minutes";

    // 活动调度
    pub const CAMPAIGN_CREATE_TIME: &str = "campaign_create_time";

    // 存储
    pub const STORAGE_TIMEOUT_MS: &str = "storage_timeout_ms";
    pub const ENFORCE_CAMPAIGN_EXISTS: &str = "enforce_campaign_exists";
}

// 默认值
const DEFAULT_WINDOW_OPEN: &str = "22:55";
const DEFAULT_UTC_OFFSET_MINUTES: &str = "480";
const DEFAULT_CAMPAIGN_CREATE_TIME: &str = "22:30";
const DEFAULT_STORAGE_TIMEOUT_MS: &str = "3000";
const DEFAULT_ENFORCE_CAMPAIGN_EXISTS: &str = "true";

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 解析 HH:MM 或 HH:MM:SS
pub fn parse_time_of_day(key: &str, value: &str) -> ConfigResult<NaiveTime> {
    let v = value.trim();
    NaiveTime::parse_from_str(v, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(v, "%H:%M"))
        .map_err(|e| invalid(key, value, e.to_string()))
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(invalid(key, value, "期望布尔值")),
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 删除配置（恢复默认值）
    pub fn remove_config_value(&self, key: &str) -> ConfigResult<bool> {
        let conn = self.get_conn()?;
        let n = conn.execute("DELETE FROM config_kv WHERE key = ?1", params![key])?;
        Ok(n > 0)
    }

    /// 获取所有配置的快照（JSON格式，按 key 排序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// ReservationConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ReservationConfigReader for ConfigManager {
    // ===== 预约窗口 =====

    async fn get_window_open(&self) -> ConfigResult<NaiveTime> {
        let key = config_keys::RESERVATION_WINDOW_OPEN;
        let value = self.get_config_or_default(key, DEFAULT_WINDOW_OPEN)?;
        parse_time_of_day(key, &value)
    }

    async fn get_window_close(&self) -> ConfigResult<Option<NaiveTime>> {
        let key = config_keys::RESERVATION_WINDOW_CLOSE;
        match self.get_config_value(key)? {
            Some(value) if !value.trim().is_empty() => Ok(Some(parse_time_of_day(key, &value)?)),
            _ => Ok(None),
        }
    }

    async fn get_utc_offset(&self) -> ConfigResult<FixedOffset> {
        let key = config_keys::RESERVATION_UTC_OFFSET_MINUTES;
        let value = self.get_config_or_default(key, DEFAULT_UTC_OFFSET_MINUTES)?;
        let minutes = value
            .trim()
            .parse::<i32>()
            .map_err(|e| invalid(key, &value, e.to_string()))?;
        offset_from_minutes(minutes).ok_or_else(|| invalid(key, &value, "时区偏移超出 ±24h"))
    }

    // ===== 活动调度 =====

    async fn get_campaign_create_time(&self) -> ConfigResult<NaiveTime> {
        let key = config_keys::CAMPAIGN_CREATE_TIME;
        let value = self.get_config_or_default(key, DEFAULT_CAMPAIGN_CREATE_TIME)?;
        parse_time_of_day(key, &value)
    }

    // ===== 存储 =====

    async fn get_storage_timeout(&self) -> ConfigResult<Duration> {
        let key = config_keys::STORAGE_TIMEOUT_MS;
        let value = self.get_config_or_default(key, DEFAULT_STORAGE_TIMEOUT_MS)?;
        let ms = value
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(key, &value, e.to_string()))?;
        if ms == 0 {
            return Err(invalid(key, &value, "超时必须大于 0"));
        }
        Ok(Duration::from_millis(ms))
    }

    async fn get_enforce_campaign_exists(&self) -> ConfigResult<bool> {
        let key = config_keys::ENFORCE_CAMPAIGN_EXISTS;
        let value = self.get_config_or_default(key, DEFAULT_ENFORCE_CAMPAIGN_EXISTS)?;
        parse_bool(key, &value)
    }
}
