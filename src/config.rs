//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `GRADELINK__*` 覆盖（双下划线表示嵌套，如 `GRADELINK__REQUEST__MAX_ATTEMPTS=5`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::credentials::{Connection, ConnectionIdentity};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub request: RequestSection,
    #[serde(default)]
    pub course_system: CourseSystemSection,
    #[serde(default)]
    pub student_info: StudentInfoSection,
    #[serde(default)]
    pub credentials: CredentialsSection,
}

/// [request] 段：重试次数、线性退避基数、单次请求超时
#[derive(Debug, Clone, Deserialize)]
pub struct RequestSection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 第 k 次失败后等待 k * backoff_base_ms
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RequestSection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

/// [course_system] 段：课程平台代理地址（操作名拼在路径末尾）
#[derive(Debug, Clone, Deserialize)]
pub struct CourseSystemSection {
    #[serde(default = "default_course_system_endpoint")]
    pub endpoint: String,
}

impl Default for CourseSystemSection {
    fn default() -> Self {
        Self {
            endpoint: default_course_system_endpoint(),
        }
    }
}

fn default_course_system_endpoint() -> String {
    "http://localhost:3000/api/canvas".to_string()
}

/// [student_info] 段：学生信息系统代理地址（所有 action 共用）
#[derive(Debug, Clone, Deserialize)]
pub struct StudentInfoSection {
    #[serde(default = "default_student_info_endpoint")]
    pub endpoint: String,
}

impl Default for StudentInfoSection {
    fn default() -> Self {
        Self {
            endpoint: default_student_info_endpoint(),
        }
    }
}

fn default_student_info_endpoint() -> String {
    "http://localhost:3000/api/studentvue".to_string()
}

/// [credentials] 段：仅 CLI 用来填充内存凭据存储
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsSection {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    pub course_system: Option<CourseSystemCredentials>,
    pub student_info: Option<StudentInfoCredentials>,
}

impl Default for CredentialsSection {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            course_system: None,
            student_info: None,
        }
    }
}

fn default_user_id() -> String {
    "local".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseSystemCredentials {
    pub domain: String,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudentInfoCredentials {
    pub district_url: String,
    pub username: String,
    pub password: String,
}

impl CredentialsSection {
    /// 已配置的连接（均标记为 connected）
    pub fn connections(&self) -> Vec<Connection> {
        let mut out = Vec::new();
        if let Some(c) = &self.course_system {
            out.push(Connection::connected(ConnectionIdentity::CourseSystem {
                domain: c.domain.clone(),
                token: c.token.clone(),
            }));
        }
        if let Some(s) = &self.student_info {
            out.push(Connection::connected(ConnectionIdentity::StudentInfo {
                district_url: s.district_url.clone(),
                username: s.username.clone(),
                password: s.password.clone(),
            }));
        }
        out
    }
}

/// 从 config 目录加载配置，环境变量 GRADELINK__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 GRADELINK__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("GRADELINK")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.request.max_attempts, 3);
        assert_eq!(cfg.request.backoff_base_ms, 1000);
        assert!(cfg.course_system.endpoint.ends_with("/api/canvas"));
        assert!(cfg.credentials.connections().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[request]
max_attempts = 5
backoff_base_ms = 10

[student_info]
endpoint = "https://proxy.example/sis"

[credentials]
user_id = "alice"

[credentials.student_info]
district_url = "https://district.example"
username = "alice"
password = "pw"
"#
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.request.max_attempts, 5);
        assert_eq!(cfg.request.backoff_base_ms, 10);
        assert_eq!(cfg.request.timeout_secs, 30);
        assert_eq!(cfg.student_info.endpoint, "https://proxy.example/sis");
        assert_eq!(cfg.credentials.user_id, "alice");
        let conns = cfg.credentials.connections();
        assert_eq!(conns.len(), 1);
        assert!(conns[0].connected);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[course_system]
endpoint = "https://file.example/canvas"
"#
        )
        .unwrap();

        std::env::set_var("GRADELINK__COURSE_SYSTEM__ENDPOINT", "https://env.example/canvas");
        let cfg = load_config(Some(file.path().to_path_buf()));
        std::env::remove_var("GRADELINK__COURSE_SYSTEM__ENDPOINT");

        let cfg = cfg.unwrap();
        assert_eq!(cfg.course_system.endpoint, "https://env.example/canvas");
        assert_eq!(cfg.request.max_attempts, 3);
    }
}
