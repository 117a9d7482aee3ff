// ==========================================
// 优惠券预约系统 - 预约时间窗口准入
// ==========================================
// 红线: 纯函数判定，不读取系统时钟（now 由调用方注入）
// ==========================================
// 职责: 判定给定时刻是否落在每日本地时间预约窗口内
// 输入: now (UTC)
// 输出: GateDecision (Allowed / Denied)
// ==========================================

use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, Offset, Utc};

/// 默认开放时刻 22:55（本地时间）
pub const DEFAULT_WINDOW_OPEN: (u32, u32) = (22, 55);

/// 默认时区偏移 UTC+8（分钟）
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 8 * 60;

/// 分钟偏移 → FixedOffset（超出 ±24h 返回 None）
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
}

// ==========================================
// ReservationWindow - 每日预约窗口
// ==========================================
// 规则:
// - close 未配置: [open, 24:00)
// - close > open: [open, close)
// - close <= open: 跨零点，[open, 24:00) ∪ [00:00, close)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationWindow {
    pub open: NaiveTime,
    pub close: Option<NaiveTime>,
    pub utc_offset: FixedOffset,
}

impl Default for ReservationWindow {
    fn default() -> Self {
        let (h, m) = DEFAULT_WINDOW_OPEN;
        Self {
            open: NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN),
            close: None,
            utc_offset: offset_from_minutes(DEFAULT_UTC_OFFSET_MINUTES).unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl ReservationWindow {
    pub fn new(open: NaiveTime, close: Option<NaiveTime>, utc_offset: FixedOffset) -> Self {
        Self {
            open,
            close,
            utc_offset,
        }
    }

    /// 换算为窗口所在时区的本地时间
    pub fn local_datetime(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.utc_offset).naive_local()
    }

    /// 本地时刻是否在窗口内
    pub fn contains(&self, local: NaiveTime) -> bool {
        match self.close {
            None => local >= self.open,
            Some(close) if close > self.open => local >= self.open && local < close,
            Some(close) => local >= self.open || local < close,
        }
    }
}

// ==========================================
// GateDecision - 准入结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    /// 非预约时间（策略拒绝，不是系统错误）
    Denied { local_time: NaiveDateTime },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed)
    }
}

// ==========================================
// EligibilityGate - 时间窗口准入
// ==========================================
// 红线: 无状态、无副作用、无 I/O 操作
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityGate {
    window: ReservationWindow,
}

impl EligibilityGate {
    pub fn new(window: ReservationWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &ReservationWindow {
        &self.window
    }

    /// 判定 now 是否允许预约
    pub fn check(&self, now: DateTime<Utc>) -> GateDecision {
        let local = self.window.local_datetime(now);
        if self.window.contains(local.time()) {
            GateDecision::Allowed
        } else {
            GateDecision::Denied { local_time: local }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn taipei() -> FixedOffset {
        offset_from_minutes(480).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        taipei()
            .with_ymd_and_hms(2024, 8, 26, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // ==========================================
    // 测试 1: 默认窗口边界
    // ==========================================

    #[test]
    fn test_default_window_open_boundary() {
        let gate = EligibilityGate::default();
        assert!(gate.check(at(22, 55)).is_allowed());
        assert!(!gate.check(at(22, 54)).is_allowed());
    }

    #[test]
    fn test_default_window_until_midnight() {
        let gate = EligibilityGate::default();
        assert!(gate.check(at(23, 59)).is_allowed());
        assert!(!gate.check(at(0, 0)).is_allowed());
        assert!(!gate.check(at(12, 0)).is_allowed());
    }

    #[test]
    fn test_denied_reports_local_time() {
        let gate = EligibilityGate::default();
        match gate.check(at(22, 54)) {
            GateDecision::Denied { local_time } => {
                assert_eq!(local_time.time(), hm(22, 54));
            }
            GateDecision::Allowed => panic!("22:54 不应允许预约"),
        }
    }

    #[test]
    fn test_utc_instant_is_converted() {
        // 14:55 UTC = 22:55 UTC+8
        let gate = EligibilityGate::default();
        let now = Utc.with_ymd_and_hms(2024, 8, 26, 14, 55, 0).unwrap();
        assert!(gate.check(now).is_allowed());
    }

    // ==========================================
    // 测试 2: 配置关闭时刻
    // ==========================================

    #[test]
    fn test_window_with_close() {
        let gate = EligibilityGate::new(ReservationWindow::new(hm(22, 55), Some(hm(23, 0)), taipei()));
        assert!(gate.check(at(22, 55)).is_allowed());
        assert!(gate.check(at(22, 59)).is_allowed());
        assert!(!gate.check(at(23, 0)).is_allowed());
    }

    #[test]
    fn test_window_wrapping_midnight() {
        let gate = EligibilityGate::new(ReservationWindow::new(hm(23, 0), Some(hm(1, 0)), taipei()));
        assert!(gate.check(at(23, 30)).is_allowed());
        assert!(gate.check(at(0, 30)).is_allowed());
        assert!(!gate.check(at(1, 0)).is_allowed());
        assert!(!gate.check(at(22, 59)).is_allowed());
    }

    #[test]
    fn test_offset_from_minutes_range() {
        assert!(offset_from_minutes(480).is_some());
        assert!(offset_from_minutes(-300).is_some());
        assert!(offset_from_minutes(24 * 60).is_none());
    }
}
