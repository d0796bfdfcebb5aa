//! 规范化后的实体
//!
//! 只在 normalize 模块内由原始负载构造，之后不再修改；下一轮刷新整体替换。

use serde::Serialize;

/// 课程：名称、教师、节次、等级、百分比与作业
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Course {
    /// 来源系统内的课程 id（学生信息系统没有时为空）
    pub id: String,
    pub name: String,
    pub teacher: String,
    pub period: String,
    pub grade: String,
    /// 解析失败为 0
    pub percentage: f64,
    pub assignments: Vec<Assignment>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Assignment {
    pub name: String,
    pub score: f64,
    pub max_score: f64,
    pub due_date: String,
    pub category: String,
    /// 所属课程 / 上下文 id
    pub context_id: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AbsencePeriod {
    pub number: String,
    pub name: String,
    pub reason: String,
    pub course: String,
    pub staff: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Absence {
    pub date: String,
    pub reason: String,
    pub note: String,
    pub periods: Vec<AbsencePeriod>,
}

/// 各类型考勤合计
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AttendanceTotals {
    pub activities: f64,
    pub tardies: f64,
    pub unexcused: f64,
    pub unexcused_tardies: f64,
}

/// 考勤：合计 + 缺勤列表
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attendance {
    pub totals: AttendanceTotals,
    pub absences: Vec<Absence>,
}

/// 展平的单条考勤记录（某天某课的状态）
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttendanceRecord {
    pub date: String,
    pub course: String,
    pub status: String,
}

impl Attendance {
    /// 按缺勤日期 × 节次展平；节次的 reason 为空时沿用当天的 reason
    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.absences
            .iter()
            .flat_map(|absence| {
                absence.periods.iter().map(move |p| AttendanceRecord {
                    date: absence.date.clone(),
                    course: p.course.clone(),
                    status: if p.reason.is_empty() {
                        absence.reason.clone()
                    } else {
                        p.reason.clone()
                    },
                })
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub period: String,
    pub course: String,
    pub teacher: String,
    pub room: String,
    pub teacher_contact: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Schedule {
    pub school_name: String,
    pub term: String,
    pub entries: Vec<ScheduleEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SchoolInfo {
    pub name: String,
    pub principal: String,
    pub address: String,
    pub phone: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: String,
    pub context_id: String,
    pub body: String,
}

/// 讨论与公告共用的帖子结构
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub posted_at: String,
    pub last_activity_at: String,
    pub context_id: String,
    pub author: String,
    pub body: String,
}

pub type Discussion = Post;
pub type Announcement = Post;
