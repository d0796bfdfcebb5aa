//! Gradelink 命令行入口
//!
//! 初始化日志、加载配置，用配置中的凭据填充内存凭据存储，刷新一次并输出 JSON（含 GPA）。
//! 用法：`gradelink [config.toml]`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use gradelink::client::{ReqwestTransport, RequestClient, RetryPolicy};
use gradelink::config::load_config;
use gradelink::credentials::{MemoryCredentialStore, StaticAuthProvider, SystemName};
use gradelink::{compute_gpa, grade_color, observability, Aggregator, Endpoints};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path).context("Failed to load config")?;

    let user_id = config.credentials.user_id.clone();
    let store = MemoryCredentialStore::new();
    let mut enabled: Vec<SystemName> = Vec::new();
    for conn in config.credentials.connections() {
        enabled.push(conn.system());
        store.insert(user_id.clone(), conn).await;
    }
    if enabled.is_empty() {
        tracing::warn!("no credentials configured, snapshot will be empty");
    }
    let auth = StaticAuthProvider::signed_in(user_id);

    let transport = Arc::new(
        ReqwestTransport::new(config.request.timeout_secs).context("Failed to create HTTP transport")?,
    );
    let client = Arc::new(RequestClient::new(
        transport,
        RetryPolicy::from_config(&config.request),
    ));
    let aggregator = Aggregator::connect(&auth, &store, client, &Endpoints::from_config(&config))
        .await
        .context("Failed to resolve session")?;

    let snapshot = aggregator.refresh(&enabled).await;
    for (key, message) in snapshot.failures() {
        tracing::warn!(bucket = %key, error = %message, "bucket failed");
    }

    let courses = snapshot.all_courses();
    let report = json!({
        "gpa": compute_gpa(&courses),
        "courses": courses
            .iter()
            .map(|c| json!({
                "name": c.name,
                "grade": c.grade,
                "percentage": c.percentage,
                "color": grade_color(c.percentage),
            }))
            .collect::<Vec<_>>(),
        "snapshot": snapshot,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize snapshot")?
    );

    Ok(())
}
