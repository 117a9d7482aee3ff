// ==========================================
// 优惠券预约系统 - 活动数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::campaign::Campaign;
use crate::domain::types::CampaignId;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

/// 活动ID → SQLite INTEGER
pub(crate) fn campaign_id_to_sql(id: CampaignId) -> RepositoryResult<i64> {
    i64::try_from(id).map_err(|e| RepositoryError::FieldValueError {
        field: "campaign_id".to_string(),
        message: e.to_string(),
    })
}

/// SQLite INTEGER → 活动ID（用于 row 映射闭包内）
pub(crate) fn campaign_id_from_sql(idx: usize, raw: i64) -> rusqlite::Result<CampaignId> {
    CampaignId::try_from(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

fn map_campaign_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Campaign> {
    Ok(Campaign {
        id: campaign_id_from_sql(0, row.get(0)?)?,
        created_at: row.get(1)?,
    })
}

// ==========================================
// CampaignRepository - 活动仓储
// ==========================================
/// 活动仓储
/// 职责: 管理 campaign 表（只追加，不更新、不删除）
pub struct CampaignRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CampaignRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 按数据库路径创建仓储实例（独立连接）
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建活动
    ///
    /// # 参数
    /// - `created_at`: 创建时间 (UTC 秒级时间戳)
    ///
    /// # 返回
    /// - Ok(Campaign): 新活动（含自增ID）
    /// - Err: 数据库错误
    pub fn create(&self, created_at: i64) -> RepositoryResult<Campaign> {
        let conn = self.get_conn()?;
        // INSERT 与 last_insert_rowid 在同一把锁内，ID 不会被其他写入覆盖
        conn.execute(
            "INSERT INTO campaign (created_at) VALUES (?1)",
            params![created_at],
        )?;
        let raw_id = conn.last_insert_rowid();
        let id = CampaignId::try_from(raw_id).map_err(|e| RepositoryError::FieldValueError {
            field: "campaign.id".to_string(),
            message: e.to_string(),
        })?;

        Ok(Campaign { id, created_at })
    }

    /// 查询最新活动（ID 最大者）
    ///
    /// # 返回
    /// - Ok(Some(Campaign)): 最新活动
    /// - Ok(None): 尚无任何活动
    /// - Err: 数据库错误
    pub fn find_latest(&self) -> RepositoryResult<Option<Campaign>> {
        let conn = self.get_conn()?;
        let campaign = conn
            .query_row(
                "SELECT id, created_at FROM campaign ORDER BY id DESC LIMIT 1",
                [],
                map_campaign_row,
            )
            .optional()?;
        Ok(campaign)
    }

    /// 按ID查询活动
    pub fn find_by_id(&self, id: CampaignId) -> RepositoryResult<Option<Campaign>> {
        let raw_id = campaign_id_to_sql(id)?;
        let conn = self.get_conn()?;
        let campaign = conn
            .query_row(
                "SELECT id, created_at FROM campaign WHERE id = ?1",
                params![raw_id],
                map_campaign_row,
            )
            .optional()?;
        Ok(campaign)
    }

    /// 活动总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM campaign", [], |row| row.get(0))?;
        Ok(n)
    }
}
