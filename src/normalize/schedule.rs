//! 学生信息系统课表与学校信息
//!
//! 课表的班级列表依次尝试三种容器：
//! 1. `ClassLists.ClassListing`
//! 2. `TodayScheduleInfoData.SchoolInfos.SchoolInfo[0].Classes.ClassInfo`
//! 3. `TermLists.TermListing[0].Classes.ClassListing`

use serde_json::Value;

use crate::core::FetchError;
use crate::model::{Schedule, ScheduleEntry, SchoolInfo};
use crate::normalize::value::{
    collection, expect_object, field, first, path, root_object, text_or, UNKNOWN_COURSE,
    UNKNOWN_TEACHER,
};

/// `StudentClassSchedule` 缺失时返回 None
pub fn normalize_schedule(payload: &Value) -> Result<Option<Schedule>, FetchError> {
    let Some(root) = root_object(payload, "schedule")? else {
        tracing::warn!(entity = "schedule", "empty schedule payload");
        return Ok(None);
    };
    let Some(schedule) = field(root, "StudentClassSchedule") else {
        tracing::warn!(entity = "schedule", "no StudentClassSchedule container");
        return Ok(None);
    };
    let schedule = expect_object(schedule, "StudentClassSchedule")?;

    let entries = class_list(schedule)?
        .into_iter()
        .map(entry)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Schedule {
        school_name: text_or(schedule, &["SchoolName"], ""),
        term: text_or(schedule, &["TermIndexName"], ""),
        entries,
    }))
}

/// 空容器（`""`、`[]`、缺失）不算命中，继续尝试下一种
fn class_list(schedule: &Value) -> Result<Vec<&Value>, FetchError> {
    let classes = collection(
        path(schedule, &["ClassLists", "ClassListing"]),
        "ClassLists.ClassListing",
    )?;
    if !classes.is_empty() {
        return Ok(classes);
    }
    if let Some(school) = first(
        path(schedule, &["TodayScheduleInfoData", "SchoolInfos", "SchoolInfo"]),
        "SchoolInfos.SchoolInfo",
    )? {
        let classes = collection(path(school, &["Classes", "ClassInfo"]), "Classes.ClassInfo")?;
        if !classes.is_empty() {
            return Ok(classes);
        }
    }
    if let Some(term) = first(path(schedule, &["TermLists", "TermListing"]), "TermLists.TermListing")? {
        let classes = collection(path(term, &["Classes", "ClassListing"]), "Classes.ClassListing")?;
        if !classes.is_empty() {
            return Ok(classes);
        }
    }
    tracing::warn!(entity = "schedule", "no class list in any known container");
    Ok(Vec::new())
}

fn entry(value: &Value) -> Result<ScheduleEntry, FetchError> {
    let value = expect_object(value, "class listing")?;
    Ok(ScheduleEntry {
        period: text_or(value, &["Period"], ""),
        course: text_or(value, &["CourseTitle", "ClassName", "Title"], UNKNOWN_COURSE),
        teacher: text_or(value, &["Teacher", "TeacherName", "Staff"], UNKNOWN_TEACHER),
        room: text_or(value, &["RoomName", "Room"], ""),
        teacher_contact: text_or(value, &["TeacherEmail", "StaffEMail", "Email"], ""),
    })
}

/// `SchoolInfo[0]`；缺失时返回 None
pub fn normalize_school_info(payload: &Value) -> Result<Option<SchoolInfo>, FetchError> {
    let Some(root) = root_object(payload, "school info")? else {
        tracing::warn!(entity = "school_info", "empty school info payload");
        return Ok(None);
    };
    let Some(info) = first(field(root, "SchoolInfo"), "SchoolInfo")? else {
        tracing::warn!(entity = "school_info", "no SchoolInfo container");
        return Ok(None);
    };
    let info = expect_object(info, "SchoolInfo")?;
    Ok(Some(SchoolInfo {
        name: text_or(info, &["School", "SchoolName"], ""),
        principal: text_or(info, &["Principal"], ""),
        address: text_or(info, &["SchoolAddress", "Address"], ""),
        phone: text_or(info, &["Phone"], ""),
        url: text_or(info, &["URL"], ""),
    }))
}
