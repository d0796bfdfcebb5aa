//! 传输层：POST JSON，返回状态码与原始文本
//!
//! RequestClient 只依赖 Transport trait；生产用 reqwest，测试用脚本化实现。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::core::FetchError;
use crate::credentials::SystemName;

/// 一次出站请求：目标系统、操作名、URL 与 JSON 请求体
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub system: SystemName,
    pub operation: String,
    pub url: String,
    pub body: Value,
}

/// 原始响应：状态码 + 文本（此层不解析 JSON）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 传输抽象：错误以字符串返回，由 RequestClient 归类为 FetchError::Transport
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: &OutboundRequest) -> Result<TransportResponse, String>;
}

/// 基于 reqwest 的传输实现，带整体超时
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// 客户端构建失败（如 TLS 后端初始化失败）时返回错误，不退回无超时的默认客户端
    pub fn new(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("gradelink/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build HTTP client");
                FetchError::Transport(format!("Build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: &OutboundRequest) -> Result<TransportResponse, String> {
        let resp = self
            .client
            .post(&request.url)
            .json(&request.body)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| format!("Read body: {}", e))?;
        Ok(TransportResponse { status, body })
    }
}
