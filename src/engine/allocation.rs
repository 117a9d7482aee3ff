// ==========================================
// 优惠券预约系统 - 确定性分配规则
// ==========================================
// 规则: v = campaign_id + sum(user_id 各字符码点)，v % 5 == 0 即中签（约 1/5）
// 红线: 纯函数、无隐藏随机性；同一 (campaign_id, user_id) 结果永远一致
// 红线: 只决定"是否中签"，券码由注入的生成器产生
// ==========================================

use crate::domain::types::CampaignId;
use std::sync::Arc;
use uuid::Uuid;

/// 中签模数
pub const WIN_MODULUS: u64 = 5;

// ==========================================
// CouponCodeGenerator - 券码生成器
// ==========================================
// 要求: 全局唯一（抗碰撞）即可，不强制 UUID
pub trait CouponCodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// 默认实现: UUID v4
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCouponCodeGenerator;

impl CouponCodeGenerator for UuidCouponCodeGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

// ==========================================
// AllocationRule - 分配规则
// ==========================================
#[derive(Clone)]
pub struct AllocationRule {
    generator: Arc<dyn CouponCodeGenerator>,
}

impl Default for AllocationRule {
    fn default() -> Self {
        Self::new(Arc::new(UuidCouponCodeGenerator))
    }
}

impl std::fmt::Debug for AllocationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocationRule")
            .field("win_modulus", &WIN_MODULUS)
            .finish_non_exhaustive()
    }
}

impl AllocationRule {
    pub fn new(generator: Arc<dyn CouponCodeGenerator>) -> Self {
        Self { generator }
    }

    /// 抽签值: campaign_id + user_id 各字符 Unicode 码点之和（回绕加法）
    pub fn allocation_value(campaign_id: CampaignId, user_id: &str) -> u64 {
        user_id
            .chars()
            .fold(campaign_id, |acc, c| acc.wrapping_add(u64::from(c)))
    }

    /// 是否中签（纯判定，不生成券码）
    pub fn is_winner(campaign_id: CampaignId, user_id: &str) -> bool {
        Self::allocation_value(campaign_id, user_id) % WIN_MODULUS == 0
    }

    /// 分配结果
    ///
    /// # 返回
    /// - 中签: 新生成的券码
    /// - 未中签: 空串
    pub fn decide(&self, campaign_id: CampaignId, user_id: &str) -> String {
        if Self::is_winner(campaign_id, user_id) {
            self.generator.generate()
        } else {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGenerator(&'static str);

    impl CouponCodeGenerator for FixedGenerator {
        fn generate(&self) -> String {
            self.0.to_string()
        }
    }

    fn rule() -> AllocationRule {
        AllocationRule::new(Arc::new(FixedGenerator("mock_coupon_code")))
    }

    #[test]
    fn test_allocation_value() {
        // "user_id_" = 842, '4' = 52
        assert_eq!(AllocationRule::allocation_value(1, "user_id_4"), 895);
        assert_eq!(AllocationRule::allocation_value(1, "user_id_1"), 892);
        assert_eq!(AllocationRule::allocation_value(7, ""), 7);
    }

    #[test]
    fn test_non_ascii_sums_code_points() {
        // 'é' = U+00E9 = 233（UTF-8 为两个字节 0xC3 0xA9）
        assert_eq!(AllocationRule::allocation_value(2, "é"), 235);
        assert!(AllocationRule::is_winner(2, "é"));

        // '优' = U+4F18 = 20248
        assert_eq!(AllocationRule::allocation_value(2, "优"), 20250);
        assert!(AllocationRule::is_winner(2, "优"));
        assert!(!AllocationRule::is_winner(1, "优"));
    }

    #[test]
    fn test_winner_gets_generated_code() {
        assert_eq!(rule().decide(1, "user_id_4"), "mock_coupon_code");
    }

    #[test]
    fn test_loser_gets_empty_code() {
        assert_eq!(rule().decide(1, "user_id_1"), "");
    }

    #[test]
    fn test_campaign_id_shifts_outcome() {
        // 892 + 3 = 895
        assert!(!AllocationRule::is_winner(1, "user_id_1"));
        assert!(AllocationRule::is_winner(4, "user_id_1"));
    }

    #[test]
    fn test_decide_is_deterministic() {
        let rule = rule();
        for user in ["a", "user_id_4", "用户"] {
            let first = rule.decide(9, user);
            for _ in 0..10 {
                assert_eq!(rule.decide(9, user), first);
            }
        }
    }

    #[test]
    fn test_wrapping_add_does_not_panic() {
        assert_eq!(AllocationRule::allocation_value(u64::MAX, "\u{1}"), 0);
        assert!(AllocationRule::is_winner(u64::MAX, "\u{1}"));
    }

    #[test]
    fn test_uuid_generator_unique() {
        let g = UuidCouponCodeGenerator;
        assert_ne!(g.generate(), g.generate());
    }
}
