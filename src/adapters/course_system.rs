//! 课程平台适配器（Canvas 类）

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::adapters::{merge_body, SourceAdapter};
use crate::client::{OutboundRequest, RequestClient};
use crate::core::FetchError;
use crate::credentials::{Connection, ConnectionIdentity, SystemName};

pub const COURSES: &str = "courses";
pub const ASSIGNMENTS: &str = "assignments";
pub const CALENDAR: &str = "calendar";
pub const DISCUSSIONS: &str = "discussions";
pub const ANNOUNCEMENTS: &str = "announcements";

/// 仅供外部直接 `call`：快照刷新不拉取，原始负载原样返回，不做规范化
pub const GRADES: &str = "grades";
/// 同上，仪表盘卡片的原始负载
pub const DASHBOARD: &str = "dashboard";

const OPERATIONS: &[&str] = &[
    COURSES,
    ASSIGNMENTS,
    GRADES,
    CALENDAR,
    DISCUSSIONS,
    ANNOUNCEMENTS,
    DASHBOARD,
];

pub struct CourseSystemAdapter {
    client: Arc<RequestClient>,
    endpoint: String,
    connection: Option<Connection>,
}

impl CourseSystemAdapter {
    pub fn new(client: Arc<RequestClient>, endpoint: impl Into<String>, connection: Option<Connection>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            connection,
        }
    }
}

#[async_trait]
impl SourceAdapter for CourseSystemAdapter {
    fn system(&self) -> SystemName {
        SystemName::CourseSystem
    }

    fn operations(&self) -> &'static [&'static str] {
        OPERATIONS
    }

    fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    fn client(&self) -> &Arc<RequestClient> {
        &self.client
    }

    fn build_request(
        &self,
        operation: &str,
        identity: &ConnectionIdentity,
        params: &Value,
    ) -> Result<OutboundRequest, FetchError> {
        let ConnectionIdentity::CourseSystem { domain, token } = identity else {
            return Err(FetchError::CredentialMissing {
                system: SystemName::CourseSystem,
            });
        };
        Ok(OutboundRequest {
            system: SystemName::CourseSystem,
            operation: operation.to_string(),
            url: format!("{}/{}", self.endpoint.trim_end_matches('/'), operation),
            body: merge_body(
                params,
                vec![
                    ("token", Value::String(token.clone())),
                    ("domain", Value::String(domain.clone())),
                ],
            ),
        })
    }
}
