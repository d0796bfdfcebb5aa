//! 脚本化 Transport（用于测试，无需网络）
//!
//! 按 (系统, 操作名) 排队预设响应，依次弹出；同时记录每次请求。

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::transport::{OutboundRequest, Transport, TransportResponse};
use crate::credentials::SystemName;

type Script = VecDeque<Result<TransportResponse, String>>;

/// 预设响应队列；队列耗尽时返回传输错误
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<(SystemName, String), Script>>,
    calls: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, system: SystemName, operation: &str, response: Result<TransportResponse, String>) {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts
                .entry((system, operation.to_string()))
                .or_default()
                .push_back(response);
        }
    }

    pub fn push_json(&self, system: SystemName, operation: &str, payload: Value) {
        self.push(system, operation, Ok(TransportResponse::ok(payload.to_string())));
    }

    pub fn push_status(&self, system: SystemName, operation: &str, status: u16) {
        self.push(
            system,
            operation,
            Ok(TransportResponse {
                status,
                body: String::new(),
            }),
        );
    }

    pub fn push_failure(&self, system: SystemName, operation: &str, message: &str) {
        self.push(system, operation, Err(message.to_string()));
    }

    /// 已发出的请求（按到达顺序）
    pub fn calls(&self) -> Vec<OutboundRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, request: &OutboundRequest) -> Result<TransportResponse, String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        let next = self.scripts.lock().ok().and_then(|mut scripts| {
            scripts
                .get_mut(&(request.system, request.operation.clone()))
                .and_then(|queue| queue.pop_front())
        });
        next.unwrap_or_else(|| {
            Err(format!(
                "no scripted response for {}:{}",
                request.system.as_str(),
                request.operation
            ))
        })
    }
}
