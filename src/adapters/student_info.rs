//! 学生信息系统适配器（StudentVUE 类）：所有操作共用一个地址，用 action 区分

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::adapters::{merge_body, SourceAdapter};
use crate::client::{OutboundRequest, RequestClient};
use crate::core::FetchError;
use crate::credentials::{Connection, ConnectionIdentity, SystemName};

pub const GRADEBOOK: &str = "gradebook";
pub const CALENDAR: &str = "calendar";
pub const ATTENDANCE: &str = "attendance";
pub const SCHEDULE: &str = "schedule";
pub const SCHOOL_INFO: &str = "schoolInfo";

const OPERATIONS: &[&str] = &[GRADEBOOK, CALENDAR, ATTENDANCE, SCHEDULE, SCHOOL_INFO];

pub struct StudentInfoAdapter {
    client: Arc<RequestClient>,
    endpoint: String,
    connection: Option<Connection>,
}

impl StudentInfoAdapter {
    pub fn new(client: Arc<RequestClient>, endpoint: impl Into<String>, connection: Option<Connection>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            connection,
        }
    }
}

#[async_trait]
impl SourceAdapter for StudentInfoAdapter {
    fn system(&self) -> SystemName {
        SystemName::StudentInfo
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
        let ConnectionIdentity::StudentInfo {
            district_url,
            username,
            password,
        } = identity
        else {
            return Err(FetchError::CredentialMissing {
                system: SystemName::StudentInfo,
            });
        };
        Ok(OutboundRequest {
            system: SystemName::StudentInfo,
            operation: operation.to_string(),
            url: self.endpoint.clone(),
            body: merge_body(
                params,
                vec![
                    ("districtUrl", Value::String(district_url.clone())),
                    ("username", Value::String(username.clone())),
                    ("password", Value::String(password.clone())),
                    ("action", Value::String(operation.to_string())),
                ],
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{RetryPolicy, ScriptedTransport};
    use serde_json::json;

    fn connection() -> Connection {
        Connection::connected(ConnectionIdentity::StudentInfo {
            district_url: "https://district.example".into(),
            username: "s123".into(),
            password: "pw".into(),
        })
    }

    fn adapter(transport: Arc<ScriptedTransport>, connection: Option<Connection>) -> StudentInfoAdapter {
        let client = Arc::new(RequestClient::new(transport, RetryPolicy::default()));
        StudentInfoAdapter::new(client, "http://proxy/api/studentvue", connection)
    }

    #[tokio::test]
    async fn test_posts_action_to_shared_endpoint() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(SystemName::StudentInfo, ATTENDANCE, json!({"Attendance": {}}));
        transport.push_json(SystemName::StudentInfo, SCHEDULE, json!({}));
        let adapter = adapter(transport.clone(), Some(connection()));

        adapter.call(ATTENDANCE, Value::Null).await.unwrap();
        adapter.call(SCHEDULE, json!({"termIndex": 1})).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].url, "http://proxy/api/studentvue");
        assert_eq!(calls[1].url, "http://proxy/api/studentvue");
        assert_eq!(
            calls[0].body,
            json!({
                "districtUrl": "https://district.example",
                "username": "s123",
                "password": "pw",
                "action": "attendance"
            })
        );
        assert_eq!(calls[1].body["action"], "schedule");
        assert_eq!(calls[1].body["termIndex"], 1);
    }

    #[tokio::test]
    async fn test_rejects_course_system_identity() {
        let transport = Arc::new(ScriptedTransport::new());
        let wrong = Connection::connected(ConnectionIdentity::CourseSystem {
            domain: "d".into(),
            token: "t".into(),
        });
        let err = adapter(transport.clone(), Some(wrong))
            .call(GRADEBOOK, json!({}))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::CredentialMissing {
                system: SystemName::StudentInfo
            }
        );
        assert_eq!(transport.call_count(), 0);
    }
}
