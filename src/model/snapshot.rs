//! 学业快照：一次刷新的完整结果
//!
//! 每个 (来源 × 实体类型) 一个 Bucket，四种状态互不混淆：
//! Pending（未拉取 / 来源未启用）、Empty（拉取成功但无数据）、Ready、Failed（附错误信息）。
//! 快照由 Aggregator 一次性组装，之后只读；刷新产生新快照而不是修改旧的。

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::credentials::SystemName;
use crate::model::entities::{
    Announcement, Assignment, Attendance, CalendarEvent, Course, Discussion, Schedule, SchoolInfo,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Bucket<T> {
    Pending,
    Empty,
    Ready(T),
    Failed { message: String },
}

/// Bucket 的状态（不带数据）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketState {
    Pending,
    Empty,
    Ready,
    Failed,
}

impl<T> Default for Bucket<T> {
    fn default() -> Self {
        Bucket::Pending
    }
}

impl<T> Bucket<Vec<T>> {
    /// 空列表视为 Empty
    pub fn from_list(items: Vec<T>) -> Self {
        if items.is_empty() {
            Bucket::Empty
        } else {
            Bucket::Ready(items)
        }
    }
}

impl<T> Bucket<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Bucket::Ready(v),
            None => Bucket::Empty,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Bucket::Failed {
            message: message.into(),
        }
    }

    pub fn state(&self) -> BucketState {
        match self {
            Bucket::Pending => BucketState::Pending,
            Bucket::Empty => BucketState::Empty,
            Bucket::Ready(_) => BucketState::Ready,
            Bucket::Failed { .. } => BucketState::Failed,
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Bucket::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Bucket::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Bucket::Failed { .. })
    }
}

/// 实体类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Courses,
    Assignments,
    Calendar,
    Discussions,
    Announcements,
    Attendance,
    Schedule,
    SchoolInfo,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Courses => "courses",
            EntityKind::Assignments => "assignments",
            EntityKind::Calendar => "calendar",
            EntityKind::Discussions => "discussions",
            EntityKind::Announcements => "announcements",
            EntityKind::Attendance => "attendance",
            EntityKind::Schedule => "schedule",
            EntityKind::SchoolInfo => "school_info",
        }
    }
}

/// 来源限定的 bucket 键，如 `student_info.attendance`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct BucketKey {
    pub source: SystemName,
    pub kind: EntityKind,
}

impl BucketKey {
    pub fn new(source: SystemName, kind: EntityKind) -> Self {
        Self { source, kind }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.source.as_str(), self.kind.as_str())
    }
}

/// 课程平台的 bucket
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CourseSystemData {
    pub courses: Bucket<Vec<Course>>,
    pub assignments: Bucket<Vec<Assignment>>,
    pub calendar: Bucket<Vec<CalendarEvent>>,
    pub discussions: Bucket<Vec<Discussion>>,
    pub announcements: Bucket<Vec<Announcement>>,
}

/// 学生信息系统的 bucket
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StudentInfoData {
    /// 来自 gradebook
    pub courses: Bucket<Vec<Course>>,
    /// 来自日历中的作业类事件
    pub assignments: Bucket<Vec<Assignment>>,
    pub attendance: Bucket<Attendance>,
    pub schedule: Bucket<Schedule>,
    pub school_info: Bucket<SchoolInfo>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AcademicSnapshot {
    id: Uuid,
    fetched_at: DateTime<Utc>,
    course_system: CourseSystemData,
    student_info: StudentInfoData,
}

impl AcademicSnapshot {
    pub fn new(course_system: CourseSystemData, student_info: StudentInfoData) -> Self {
        Self {
            id: Uuid::new_v4(),
            fetched_at: Utc::now(),
            course_system,
            student_info,
        }
    }

    /// 全部 Pending 的快照（尚未刷新）
    pub fn pending() -> Self {
        Self::new(CourseSystemData::default(), StudentInfoData::default())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn course_system(&self) -> &CourseSystemData {
        &self.course_system
    }

    pub fn student_info(&self) -> &StudentInfoData {
        &self.student_info
    }

    /// 所有存在的 bucket 键
    pub fn keys() -> Vec<BucketKey> {
        use EntityKind::*;
        let cs = [Courses, Assignments, Calendar, Discussions, Announcements]
            .into_iter()
            .map(|k| BucketKey::new(SystemName::CourseSystem, k));
        let si = [Courses, Assignments, Attendance, Schedule, SchoolInfo]
            .into_iter()
            .map(|k| BucketKey::new(SystemName::StudentInfo, k));
        cs.chain(si).collect()
    }

    /// 按键查询状态与失败信息；该来源没有这种实体时返回 None
    pub fn lookup(&self, key: BucketKey) -> Option<(BucketState, Option<&str>)> {
        fn pair<T>(b: &Bucket<T>) -> Option<(BucketState, Option<&str>)> {
            Some((b.state(), b.failure()))
        }
        let cs = &self.course_system;
        let si = &self.student_info;
        match (key.source, key.kind) {
            (SystemName::CourseSystem, EntityKind::Courses) => pair(&cs.courses),
            (SystemName::CourseSystem, EntityKind::Assignments) => pair(&cs.assignments),
            (SystemName::CourseSystem, EntityKind::Calendar) => pair(&cs.calendar),
            (SystemName::CourseSystem, EntityKind::Discussions) => pair(&cs.discussions),
            (SystemName::CourseSystem, EntityKind::Announcements) => pair(&cs.announcements),
            (SystemName::StudentInfo, EntityKind::Courses) => pair(&si.courses),
            (SystemName::StudentInfo, EntityKind::Assignments) => pair(&si.assignments),
            (SystemName::StudentInfo, EntityKind::Attendance) => pair(&si.attendance),
            (SystemName::StudentInfo, EntityKind::Schedule) => pair(&si.schedule),
            (SystemName::StudentInfo, EntityKind::SchoolInfo) => pair(&si.school_info),
            _ => None,
        }
    }

    pub fn state(&self, key: BucketKey) -> Option<BucketState> {
        self.lookup(key).map(|(state, _)| state)
    }

    /// 所有失败的 bucket 及其错误信息
    pub fn failures(&self) -> Vec<(BucketKey, String)> {
        Self::keys()
            .into_iter()
            .filter_map(|key| match self.lookup(key) {
                Some((BucketState::Failed, Some(msg))) => Some((key, msg.to_string())),
                _ => None,
            })
            .collect()
    }

    /// 两个来源中已就绪的课程
    pub fn all_courses(&self) -> Vec<Course> {
        let mut out = Vec::new();
        if let Some(c) = self.course_system.courses.ready() {
            out.extend(c.iter().cloned());
        }
        if let Some(c) = self.student_info.courses.ready() {
            out.extend(c.iter().cloned());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_from_list() {
        let b: Bucket<Vec<u8>> = Bucket::from_list(vec![]);
        assert_eq!(b.state(), BucketState::Empty);
        let b = Bucket::from_list(vec![1u8]);
        assert_eq!(b.state(), BucketState::Ready);
        assert_eq!(b.ready(), Some(&vec![1u8]));
    }

    #[test]
    fn test_empty_and_failed_are_distinct() {
        let empty: Bucket<Vec<u8>> = Bucket::Empty;
        let failed: Bucket<Vec<u8>> = Bucket::failed("HTTP error: status 500");
        assert_ne!(empty, failed);
        assert!(failed.is_failed());
        assert!(!empty.is_failed());
        assert_eq!(failed.failure(), Some("HTTP error: status 500"));
    }

    #[test]
    fn test_pending_snapshot() {
        let snap = AcademicSnapshot::pending();
        for key in AcademicSnapshot::keys() {
            assert_eq!(snap.state(key), Some(BucketState::Pending));
        }
        assert!(snap.failures().is_empty());
        assert!(snap
            .state(BucketKey::new(SystemName::CourseSystem, EntityKind::Attendance))
            .is_none());
    }

    #[test]
    fn test_failures_listed_with_keys() {
        let si = StudentInfoData {
            attendance: Bucket::failed("boom"),
            ..Default::default()
        };
        let snap = AcademicSnapshot::new(CourseSystemData::default(), si);
        let failures = snap.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.to_string(), "student_info.attendance");
        assert_eq!(failures[0].1, "boom");
    }

    #[test]
    fn test_new_snapshots_have_distinct_ids() {
        assert_ne!(AcademicSnapshot::pending().id(), AcademicSnapshot::pending().id());
    }

    #[test]
    fn test_bucket_serialization() {
        let b: Bucket<Vec<u8>> = Bucket::failed("x");
        let v = serde_json::to_value(&b).unwrap();
        assert_eq!(v["state"], "failed");
        assert_eq!(v["data"]["message"], "x");
    }
}
