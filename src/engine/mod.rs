// ==========================================
// 优惠券预约系统 - 引擎层
// ==========================================
// 职责: 时间窗口准入 → 确定性分配 → 原子写入
// 红线: Engine 不拼 SQL，存储通过 ReservationStore 注入
// ==========================================

pub mod allocation;
pub mod campaign_lifecycle;
pub mod clock;
pub mod eligibility;
pub mod error;
pub mod reservation;
pub mod store;

// 重导出核心引擎
pub use allocation::{AllocationRule, CouponCodeGenerator, UuidCouponCodeGenerator};
pub use campaign_lifecycle::CampaignLifecycle;
pub use clock::{Clock, FixedClock, SystemClock};
pub use eligibility::{EligibilityGate, GateDecision, ReservationWindow};
pub use error::{ErrorKind, ReservationError, ReservationResult, StorageFailureCause};
pub use reservation::{ReservationEngine, DEFAULT_STORAGE_TIMEOUT, MAX_CAMPAIGN_ID};
pub use store::{ReservationStore, SqliteReservationStore};
