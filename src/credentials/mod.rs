//! 外部协作者：凭据存储与认证
//!
//! 本 crate 不做认证，也不持久化凭据；这里只定义消费的接口，
//! 并提供内存实现（供 CLI 与测试使用）。

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// 两个后端系统
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemName {
    /// 课程管理平台（Canvas 类）
    CourseSystem,
    /// 学生信息系统（StudentVUE 类）
    StudentInfo,
}

impl SystemName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemName::CourseSystem => "course_system",
            SystemName::StudentInfo => "student_info",
        }
    }
}

impl fmt::Display for SystemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemName::CourseSystem => write!(f, "course system"),
            SystemName::StudentInfo => write!(f, "student info system"),
        }
    }
}

/// 连接身份：课程平台用 domain + token，学生信息系统用学区地址 + 账号密码
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "system", rename_all = "snake_case")]
pub enum ConnectionIdentity {
    CourseSystem {
        domain: String,
        token: String,
    },
    StudentInfo {
        district_url: String,
        username: String,
        password: String,
    },
}

// 不把 token / 密码打进日志
impl fmt::Debug for ConnectionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionIdentity::CourseSystem { domain, .. } => f
                .debug_struct("CourseSystem")
                .field("domain", domain)
                .field("token", &"***")
                .finish(),
            ConnectionIdentity::StudentInfo {
                district_url,
                username,
                ..
            } => f
                .debug_struct("StudentInfo")
                .field("district_url", district_url)
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

impl ConnectionIdentity {
    pub fn system(&self) -> SystemName {
        match self {
            ConnectionIdentity::CourseSystem { .. } => SystemName::CourseSystem,
            ConnectionIdentity::StudentInfo { .. } => SystemName::StudentInfo,
        }
    }
}

/// 某个系统的连接；connected 由调用方维护（断开后保留身份但不可用）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub identity: ConnectionIdentity,
    pub connected: bool,
}

impl Connection {
    pub fn connected(identity: ConnectionIdentity) -> Self {
        Self {
            identity,
            connected: true,
        }
    }

    pub fn system(&self) -> SystemName {
        self.identity.system()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

/// 凭据存储：按 (user_id, system) 查连接
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, user_id: &str, system: SystemName) -> Option<Connection>;
}

/// 认证提供方：当前用户与会话
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_user(&self) -> Option<User>;

    async fn current_session(&self) -> Option<Session>;
}

/// 内存凭据存储
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<(String, SystemName), Connection>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user_id: impl Into<String>, connection: Connection) {
        let key = (user_id.into(), connection.system());
        self.entries.write().await.insert(key, connection);
    }

    /// 标记断开（保留身份）；不存在时返回 false
    pub async fn set_connected(&self, user_id: &str, system: SystemName, connected: bool) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&(user_id.to_string(), system)) {
            Some(conn) => {
                conn.connected = connected;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, user_id: &str, system: SystemName) -> Option<Connection> {
        self.entries
            .read()
            .await
            .get(&(user_id.to_string(), system))
            .cloned()
    }
}

/// 固定用户的认证提供方；user 为 None 表示未登录
#[derive(Debug, Clone, Default)]
pub struct StaticAuthProvider {
    user: Option<User>,
}

impl StaticAuthProvider {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user: Some(User { id: user_id.into() }),
        }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn current_user(&self) -> Option<User> {
        self.user.clone()
    }

    async fn current_session(&self) -> Option<Session> {
        self.user.as_ref().map(|u| Session {
            user_id: u.id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sis_identity() -> ConnectionIdentity {
        ConnectionIdentity::StudentInfo {
            district_url: "https://district.example".into(),
            username: "student".into(),
            password: "hunter2".into(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_keyed_by_user_and_system() {
        let store = MemoryCredentialStore::new();
        store.insert("u1", Connection::connected(sis_identity())).await;

        assert!(store.get("u1", SystemName::StudentInfo).await.is_some());
        assert!(store.get("u1", SystemName::CourseSystem).await.is_none());
        assert!(store.get("u2", SystemName::StudentInfo).await.is_none());
    }

    #[tokio::test]
    async fn test_set_connected() {
        let store = MemoryCredentialStore::new();
        store.insert("u1", Connection::connected(sis_identity())).await;
        assert!(store.set_connected("u1", SystemName::StudentInfo, false).await);
        let conn = store.get("u1", SystemName::StudentInfo).await.unwrap();
        assert!(!conn.connected);
        assert!(!store.set_connected("u1", SystemName::CourseSystem, false).await);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let s = format!("{:?}", sis_identity());
        assert!(!s.contains("hunter2"));
        assert!(s.contains("district.example"));
    }

    #[tokio::test]
    async fn test_static_auth_provider() {
        let auth = StaticAuthProvider::signed_in("u1");
        assert_eq!(auth.current_user().await.unwrap().id, "u1");
        assert_eq!(auth.current_session().await.unwrap().user_id, "u1");
        let auth = StaticAuthProvider::signed_out();
        assert!(auth.current_user().await.is_none());
        assert!(auth.current_session().await.is_none());
    }
}
