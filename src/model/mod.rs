//! 规范模型：实体与快照

pub mod entities;
pub mod snapshot;

pub use entities::{
    Absence, AbsencePeriod, Announcement, Assignment, Attendance, AttendanceRecord,
    AttendanceTotals, CalendarEvent, Course, Discussion, Post, Schedule, ScheduleEntry, SchoolInfo,
};
pub use snapshot::{
    AcademicSnapshot, Bucket, BucketKey, BucketState, CourseSystemData, EntityKind,
    StudentInfoData,
};
