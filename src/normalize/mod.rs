//! 规范化层：原始负载 → 规范实体
//!
//! 统一策略：
//! - 单对象 / 数组塌缩：单个对象当作一元列表，缺失当作空列表
//! - 字段回退链：按固定顺序尝试候选键，都没有则用固定占位
//! - 数值：解析失败为 0
//! - 顶层容器缺失：返回空列表或 None，并告警
//! - 结构无法恢复（如该是列表的位置出现数字）：返回 FetchError::Normalization
//!
//! 所有函数都是纯函数、同步执行。

pub mod attendance;
pub mod calendar;
pub mod course_system;
pub mod gradebook;
pub mod schedule;
pub mod value;

pub use attendance::normalize_attendance;
pub use calendar::normalize_calendar_assignments;
pub use course_system::{
    normalize_announcements, normalize_assignments, normalize_calendar_events, normalize_courses,
    normalize_discussions,
};
pub use gradebook::normalize_gradebook;
pub use schedule::{normalize_schedule, normalize_school_info};
