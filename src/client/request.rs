//! 带重试的请求客户端
//!
//! 每次尝试发一次网络请求；传输失败或非 2xx 时，若非最后一次则等待 `attempt * backoff_base`
//! （线性退避）后重试。空响应体 / 非 JSON 响应体直接失败，不重试。
//! 重试过程除了打日志，还以 RetryReport 返回给调用方。

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::client::transport::{OutboundRequest, Transport, TransportResponse};
use crate::config::RequestSection;
use crate::core::FetchError;
use crate::credentials::Connection;

/// 重试策略：最大尝试次数与线性退避基数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(section: &RequestSection) -> Self {
        Self {
            max_attempts: section.max_attempts,
            backoff_base: Duration::from_millis(section.backoff_base_ms),
        }
    }

    /// 第 attempt 次失败后、下一次尝试前的等待时间
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }
}

/// 一次 execute 的重试结果：共尝试几次、每次等待多久、最后的错误
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetryReport {
    pub attempts: u32,
    pub max_attempts: u32,
    pub delays: Vec<Duration>,
    pub last_error: Option<FetchError>,
}

/// 请求客户端：持有传输实现与默认重试策略，本身无可变状态
pub struct RequestClient {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RequestClient {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 按默认策略执行
    pub async fn execute(
        &self,
        connection: Option<&Connection>,
        request: &OutboundRequest,
    ) -> Result<Value, FetchError> {
        self.execute_with_report(connection, request, self.policy.max_attempts)
            .await
            .0
    }

    /// 执行并返回重试报告；连接缺失或断开时立即返回 CredentialMissing，不发请求
    pub async fn execute_with_report(
        &self,
        connection: Option<&Connection>,
        request: &OutboundRequest,
        max_attempts: u32,
    ) -> (Result<Value, FetchError>, RetryReport) {
        let max_attempts = max_attempts.max(1);
        let mut report = RetryReport {
            max_attempts,
            ..RetryReport::default()
        };

        let ready = connection
            .map(|c| c.connected && c.system() == request.system)
            .unwrap_or(false);
        if !ready {
            let err = FetchError::CredentialMissing {
                system: request.system,
            };
            tracing::warn!(
                source = request.system.as_str(),
                operation = %request.operation,
                "no connection, request not sent"
            );
            report.last_error = Some(err.clone());
            return (Err(err), report);
        }

        let mut attempt = 1;
        loop {
            report.attempts = attempt;
            tracing::debug!(
                source = request.system.as_str(),
                operation = %request.operation,
                attempt,
                max_attempts,
                "sending request"
            );

            let err = match self.attempt(request).await {
                Ok(payload) => {
                    report.last_error = None;
                    return (Ok(payload), report);
                }
                Err(err) => err,
            };
            report.last_error = Some(err.clone());

            if !err.is_retryable() || attempt >= max_attempts {
                tracing::warn!(
                    source = request.system.as_str(),
                    operation = %request.operation,
                    attempt,
                    max_attempts,
                    error = %err,
                    "request failed"
                );
                return (Err(err), report);
            }

            let delay = self.policy.delay_after(attempt);
            tracing::warn!(
                source = request.system.as_str(),
                operation = %request.operation,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "request attempt failed, retrying"
            );
            report.delays.push(delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, request: &OutboundRequest) -> Result<Value, FetchError> {
        let resp = self
            .transport
            .post(request)
            .await
            .map_err(FetchError::Transport)?;
        if !resp.is_success() {
            return Err(FetchError::Http { status: resp.status });
        }
        parse_body(&resp)
    }
}

/// 读取响应文本：去 BOM 与空白后为空则 EmptyResponse，非 JSON 则 MalformedResponse
fn parse_body(resp: &TransportResponse) -> Result<Value, FetchError> {
    let text = resp.body.trim_start_matches('\u{FEFF}').trim();
    if text.is_empty() {
        return Err(FetchError::EmptyResponse);
    }
    serde_json::from_str(text).map_err(|e| FetchError::MalformedResponse(e.to_string()))
}
