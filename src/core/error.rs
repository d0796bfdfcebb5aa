//! 拉取错误分类
//!
//! RequestClient / Adapter / Normalization 各层统一返回 FetchError；
//! Aggregator 捕获后转为对应 Bucket 的 Failed，不会中断其它操作。

use thiserror::Error;

use crate::credentials::SystemName;

/// 拉取链路上可能出现的错误（凭据、会话、网络、HTTP 状态、响应体、规范化）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// 未配置连接或连接被标记为断开；不会发起任何网络请求
    #[error("No {system} connection configured")]
    CredentialMissing { system: SystemName },

    #[error("No active session")]
    Unauthenticated,

    /// 连接失败、超时等传输层错误（可重试）
    #[error("Transport failure: {0}")]
    Transport(String),

    /// 非 2xx 状态码（最后一次之前可重试）
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    #[error("Empty response body")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// 原始负载结构无法恢复
    #[error("Normalization failure: {0}")]
    Normalization(String),

    #[error("Unsupported {system} operation: {operation}")]
    UnsupportedOperation {
        system: SystemName,
        operation: String,
    },
}

impl FetchError {
    /// 仅传输失败与 HTTP 状态错误值得重试；空响应 / 非 JSON 直接失败
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Http { .. })
    }
}
