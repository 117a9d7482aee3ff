// ==========================================
// 优惠券预约系统 - API层错误类型
// ==========================================
// 职责: 将引擎错误归为调用方可理解的四类
// 映射: Forbidden=403, NotFound=404, InvalidInput=400, Internal=500
// ==========================================

use crate::engine::error::{ErrorKind, ReservationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    /// 策略拒绝（非预约时间）
    #[error("禁止访问: {0}")]
    Forbidden(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 存储失败/超时等内部错误（调用方可退避重试）
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 约定的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::InvalidInput(_) => 400,
            ApiError::Internal(_) => 500,
        }
    }

    /// 机器可读的错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Forbidden(_) => "NOT_RESERVATION_TIME",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 转为响应体
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

// ==========================================
// 从 ReservationError 转换
// ==========================================
impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::NotReservationTime => ApiError::Forbidden(message),
            ErrorKind::NotFound => ApiError::NotFound(message),
            ErrorKind::InvalidInput => ApiError::InvalidInput(message),
            ErrorKind::StorageFailure => ApiError::Internal(message),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

/// 错误响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::StorageFailureCause;
    use chrono::NaiveDate;
    use std::time::Duration;

    #[test]
    fn test_reservation_error_conversion() {
        let local_time = NaiveDate::from_ymd_opt(2024, 8, 26)
            .unwrap()
            .and_hms_opt(22, 54, 0)
            .unwrap();
        let api_err: ApiError = ReservationError::NotReservationTime {
            campaign_id: 1,
            user_id: "u".to_string(),
            local_time,
        }
        .into();
        assert_eq!(api_err.status_code(), 403);
        assert_eq!(api_err.error_code(), "NOT_RESERVATION_TIME");

        let api_err: ApiError = ReservationError::NoCampaign.into();
        assert_eq!(api_err.status_code(), 404);

        let api_err: ApiError = ReservationError::InvalidInput("user_id 为空".to_string()).into();
        assert_eq!(api_err.status_code(), 400);

        let api_err: ApiError = ReservationError::StorageFailure {
            operation: "insert_reservation",
            context: "campaign_id=1, user_id=u".to_string(),
            cause: StorageFailureCause::Timeout(Duration::from_millis(5)),
        }
        .into();
        assert_eq!(api_err.status_code(), 500);
        assert!(api_err.to_string().contains("campaign_id=1"));
    }

    #[test]
    fn test_error_response_json() {
        let body = ApiError::InvalidInput("campaign_id=-1".to_string()).to_response();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "INVALID_INPUT");
        assert!(json["message"].as_str().unwrap().contains("-1"));
    }
}
