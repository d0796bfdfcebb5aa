//! 数据源适配器：把「操作名 + 参数」映射为 RequestClient 的调用形状
//!
//! 两个实现只在请求形状上不同，不含业务逻辑：
//! - 课程平台：每个操作一个路径，body 为 `{ token, domain, ...params }`
//! - 学生信息系统：共用一个地址，body 为 `{ districtUrl, username, password, action, ...params }`

pub mod course_system;
pub mod student_info;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::client::{OutboundRequest, RequestClient};
use crate::core::FetchError;
use crate::credentials::{Connection, ConnectionIdentity, SystemName};

pub use course_system::CourseSystemAdapter;
pub use student_info::StudentInfoAdapter;

/// 适配器 trait：call(operation, params) -> 原始负载
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn system(&self) -> SystemName;

    /// 支持的操作名
    fn operations(&self) -> &'static [&'static str];

    fn connection(&self) -> Option<&Connection>;

    fn client(&self) -> &Arc<RequestClient>;

    /// 构造出站请求；identity 已确认属于本系统
    fn build_request(
        &self,
        operation: &str,
        identity: &ConnectionIdentity,
        params: &Value,
    ) -> Result<OutboundRequest, FetchError>;

    /// 连接缺失 / 断开时拒绝调用，不发请求
    async fn call(&self, operation: &str, params: Value) -> Result<Value, FetchError> {
        let system = self.system();
        let connection = self
            .connection()
            .filter(|c| c.connected && c.system() == system)
            .ok_or(FetchError::CredentialMissing { system })?;
        if !self.operations().iter().any(|op| *op == operation) {
            return Err(FetchError::UnsupportedOperation {
                system,
                operation: operation.to_string(),
            });
        }
        let request = self.build_request(operation, &connection.identity, &params)?;
        self.client().execute(Some(connection), &request).await
    }
}

/// 参数对象并入请求体；身份字段后写入，参数不能覆盖
fn merge_body(params: &Value, identity_fields: Vec<(&str, Value)>) -> Value {
    let mut body = Map::new();
    if let Some(obj) = params.as_object() {
        for (k, v) in obj {
            body.insert(k.clone(), v.clone());
        }
    }
    for (k, v) in identity_fields {
        body.insert(k.to_string(), v);
    }
    Value::Object(body)
}
