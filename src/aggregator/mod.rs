//! 聚合编排：并发拉取 + 规范化，组装快照
//!
//! 每个启用来源的全部实体操作并发执行；单个操作失败只把自己的 bucket 置为 Failed，
//! 不取消、不阻塞其它操作。全部操作落定后才组装并返回快照，不会中途发布部分结果。
//! 同一时刻只跑一轮刷新：`refresh` 排队等待，`try_refresh` 直接丢弃。

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::adapters::{course_system as cs_ops, student_info as si_ops};
use crate::adapters::{CourseSystemAdapter, SourceAdapter, StudentInfoAdapter};
use crate::client::RequestClient;
use crate::config::AppConfig;
use crate::core::FetchError;
use crate::credentials::{AuthProvider, CredentialStore, SystemName};
use crate::model::{
    AcademicSnapshot, Bucket, BucketKey, CourseSystemData, EntityKind, StudentInfoData,
};
use crate::normalize;

/// 两个来源的代理地址
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub course_system: String,
    pub student_info: String,
}

impl Endpoints {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            course_system: config.course_system.endpoint.clone(),
            student_info: config.student_info.endpoint.clone(),
        }
    }
}

pub struct Aggregator {
    course_system: Arc<dyn SourceAdapter>,
    student_info: Arc<dyn SourceAdapter>,
    /// 刷新互斥，防止重叠刷新
    refresh_lock: Mutex<()>,
}

impl Aggregator {
    pub fn new(course_system: Arc<dyn SourceAdapter>, student_info: Arc<dyn SourceAdapter>) -> Self {
        Self {
            course_system,
            student_info,
            refresh_lock: Mutex::new(()),
        }
    }

    /// 从认证与凭据存储构建：无当前用户或会话时返回 Unauthenticated；
    /// 缺凭据的来源仍会创建适配器，但其操作都以 CredentialMissing 失败
    pub async fn connect(
        auth: &dyn AuthProvider,
        store: &dyn CredentialStore,
        client: Arc<RequestClient>,
        endpoints: &Endpoints,
    ) -> Result<Self, FetchError> {
        let user = auth.current_user().await.ok_or(FetchError::Unauthenticated)?;
        auth.current_session()
            .await
            .ok_or(FetchError::Unauthenticated)?;

        let cs_conn = store.get(&user.id, SystemName::CourseSystem).await;
        let si_conn = store.get(&user.id, SystemName::StudentInfo).await;
        tracing::info!(
            user = %user.id,
            course_system = cs_conn.is_some(),
            student_info = si_conn.is_some(),
            "credentials resolved"
        );

        Ok(Self::new(
            Arc::new(CourseSystemAdapter::new(
                client.clone(),
                endpoints.course_system.clone(),
                cs_conn,
            )),
            Arc::new(StudentInfoAdapter::new(
                client,
                endpoints.student_info.clone(),
                si_conn,
            )),
        ))
    }

    /// 刷新；已有刷新在进行时排队等待其结束
    pub async fn refresh(&self, enabled: &[SystemName]) -> AcademicSnapshot {
        let _guard = self.refresh_lock.lock().await;
        self.run(enabled).await
    }

    /// 刷新；已有刷新在进行时直接丢弃并返回 None
    pub async fn try_refresh(&self, enabled: &[SystemName]) -> Option<AcademicSnapshot> {
        let Ok(_guard) = self.refresh_lock.try_lock() else {
            tracing::info!("refresh already in flight, dropping request");
            return None;
        };
        Some(self.run(enabled).await)
    }

    async fn run(&self, enabled: &[SystemName]) -> AcademicSnapshot {
        let cs_enabled = enabled.contains(&SystemName::CourseSystem);
        let si_enabled = enabled.contains(&SystemName::StudentInfo);
        tracing::info!(
            course_system = cs_enabled,
            student_info = si_enabled,
            "refresh started"
        );

        let (course_system, student_info) = futures_util::join!(
            async {
                if cs_enabled {
                    fetch_course_system(self.course_system.as_ref()).await
                } else {
                    CourseSystemData::default()
                }
            },
            async {
                if si_enabled {
                    fetch_student_info(self.student_info.as_ref()).await
                } else {
                    StudentInfoData::default()
                }
            },
        );

        let snapshot = AcademicSnapshot::new(course_system, student_info);
        tracing::info!(
            snapshot = %snapshot.id(),
            failures = snapshot.failures().len(),
            "refresh finished"
        );
        snapshot
    }
}

async fn fetch_course_system(adapter: &dyn SourceAdapter) -> CourseSystemData {
    use EntityKind::*;
    let key = |kind| BucketKey::new(SystemName::CourseSystem, kind);

    let (courses, assignments, calendar, discussions, announcements) = futures_util::join!(
        fetch(adapter, cs_ops::COURSES, normalize::normalize_courses),
        fetch(adapter, cs_ops::ASSIGNMENTS, normalize::normalize_assignments),
        fetch(adapter, cs_ops::CALENDAR, normalize::normalize_calendar_events),
        fetch(adapter, cs_ops::DISCUSSIONS, normalize::normalize_discussions),
        fetch(adapter, cs_ops::ANNOUNCEMENTS, normalize::normalize_announcements),
    );

    CourseSystemData {
        courses: settle_list(key(Courses), courses),
        assignments: settle_list(key(Assignments), assignments),
        calendar: settle_list(key(Calendar), calendar),
        discussions: settle_list(key(Discussions), discussions),
        announcements: settle_list(key(Announcements), announcements),
    }
}

async fn fetch_student_info(adapter: &dyn SourceAdapter) -> StudentInfoData {
    use EntityKind::*;
    let key = |kind| BucketKey::new(SystemName::StudentInfo, kind);

    let (courses, assignments, attendance, schedule, school_info) = futures_util::join!(
        fetch(adapter, si_ops::GRADEBOOK, normalize::normalize_gradebook),
        fetch(adapter, si_ops::CALENDAR, normalize::normalize_calendar_assignments),
        fetch(adapter, si_ops::ATTENDANCE, normalize::normalize_attendance),
        fetch(adapter, si_ops::SCHEDULE, normalize::normalize_schedule),
        fetch(adapter, si_ops::SCHOOL_INFO, normalize::normalize_school_info),
    );

    StudentInfoData {
        courses: settle_list(key(Courses), courses),
        assignments: settle_list(key(Assignments), assignments),
        attendance: settle_option(key(Attendance), attendance),
        schedule: settle_option(key(Schedule), schedule),
        school_info: settle_option(key(SchoolInfo), school_info),
    }
}

/// 一次 拉取 + 规范化；错误原样返回，由 settle_* 转为 Failed
async fn fetch<T, F>(adapter: &dyn SourceAdapter, operation: &str, normalize: F) -> Result<T, FetchError>
where
    F: Fn(&Value) -> Result<T, FetchError>,
{
    let payload = adapter.call(operation, json!({})).await?;
    normalize(&payload)
}

fn settle_list<T>(key: BucketKey, result: Result<Vec<T>, FetchError>) -> Bucket<Vec<T>> {
    match result {
        Ok(items) => {
            tracing::debug!(bucket = %key, count = items.len(), "bucket loaded");
            Bucket::from_list(items)
        }
        Err(e) => failed(key, e),
    }
}

fn settle_option<T>(key: BucketKey, result: Result<Option<T>, FetchError>) -> Bucket<T> {
    match result {
        Ok(value) => {
            tracing::debug!(bucket = %key, present = value.is_some(), "bucket loaded");
            Bucket::from_option(value)
        }
        Err(e) => failed(key, e),
    }
}

fn failed<T>(key: BucketKey, err: FetchError) -> Bucket<T> {
    tracing::warn!(bucket = %key, error = %err, "fetch failed");
    Bucket::failed(err.to_string())
}
