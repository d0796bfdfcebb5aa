//! Gradelink - 学业数据聚合
//!
//! 从课程管理平台与学生信息系统两个后端拉取学生学业记录，规范化为统一的内存模型。
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 拉取错误分类
//! - **credentials**: 凭据存储与认证（外部协作者接口 + 内存实现）
//! - **client**: 传输抽象与带线性退避的重试客户端
//! - **adapters**: 两个后端的请求形状映射
//! - **normalize**: 松散负载 → 规范实体
//! - **model**: 规范实体与三态 Bucket 快照
//! - **aggregator**: 并发拉取、故障隔离、快照组装
//! - **metrics**: GPA 与成绩颜色
//! - **observability**: 日志初始化

pub mod adapters;
pub mod aggregator;
pub mod client;
pub mod config;
pub mod core;
pub mod credentials;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod observability;

pub use aggregator::{Aggregator, Endpoints};
pub use crate::core::FetchError;
pub use metrics::{compute_gpa, grade_color, ColorTag};
pub use model::AcademicSnapshot;
