// ==========================================
// 优惠券预约系统 - 引擎层错误类型
// ==========================================
// 分类:
// - NotReservationTime: 策略拒绝（调用方视为 forbidden），不重试
// - NotFound: 活动/预约不存在
// - StorageFailure: 存储不可用/超时（调用方可退避重试，引擎不重试）
// - InvalidInput: 非法活动ID/用户ID
// ==========================================

use crate::domain::types::CampaignId;
use crate::repository::error::RepositoryError;
use chrono::NaiveDateTime;
use std::time::Duration;
use thiserror::Error;

/// 错误大类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotReservationTime,
    NotFound,
    StorageFailure,
    InvalidInput,
}

/// 存储失败的底层原因
#[derive(Error, Debug)]
pub enum StorageFailureCause {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("存储调用超时 ({0:?})")]
    Timeout(Duration),
}

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum ReservationError {
    #[error("非预约时间: campaign_id={campaign_id}, user_id={user_id}, local_time={local_time}")]
    NotReservationTime {
        campaign_id: CampaignId,
        user_id: String,
        local_time: NaiveDateTime,
    },

    #[error("活动不存在: campaign_id={campaign_id}")]
    CampaignNotFound { campaign_id: CampaignId },

    #[error("尚无任何活动")]
    NoCampaign,

    #[error("预约不存在: campaign_id={campaign_id}, user_id={user_id}")]
    ReservationNotFound {
        campaign_id: CampaignId,
        user_id: String,
    },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("存储失败: {operation} ({context}): {cause}")]
    StorageFailure {
        operation: &'static str,
        context: String,
        #[source]
        cause: StorageFailureCause,
    },
}

impl ReservationError {
    /// 归类
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReservationError::NotReservationTime { .. } => ErrorKind::NotReservationTime,
            ReservationError::CampaignNotFound { .. }
            | ReservationError::NoCampaign
            | ReservationError::ReservationNotFound { .. } => ErrorKind::NotFound,
            ReservationError::InvalidInput(_) => ErrorKind::InvalidInput,
            ReservationError::StorageFailure { .. } => ErrorKind::StorageFailure,
        }
    }

    /// 调用方是否可以退避重试
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::StorageFailure
    }

    pub(crate) fn storage(
        operation: &'static str,
        context: String,
        cause: impl Into<StorageFailureCause>,
    ) -> Self {
        ReservationError::StorageFailure {
            operation,
            context,
            cause: cause.into(),
        }
    }
}

/// 日志/错误上下文
pub(crate) fn context_of(campaign_id: Option<CampaignId>, user_id: Option<&str>) -> String {
    match (campaign_id, user_id) {
        (Some(c), Some(u)) => format!("campaign_id={}, user_id={}", c, u),
        (Some(c), None) => format!("campaign_id={}", c),
        (None, Some(u)) => format!("user_id={}", u),
        (None, None) => "-".to_string(),
    }
}

/// Result 类型别名
pub type ReservationResult<T> = Result<T, ReservationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(ReservationError::NoCampaign.kind(), ErrorKind::NotFound);
        assert_eq!(
            ReservationError::InvalidInput("x".to_string()).kind(),
            ErrorKind::InvalidInput
        );

        let err = ReservationError::storage(
            "get_reservation",
            context_of(Some(1), Some("u")),
            StorageFailureCause::Timeout(Duration::from_millis(10)),
        );
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("campaign_id=1, user_id=u"));
    }
}
