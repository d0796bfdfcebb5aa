//! 课程平台负载 → Course / Assignment / CalendarEvent / Post
//!
//! 代理可能直接返回数组、单个对象，或把列表包在以操作名为键的对象里；三种都接受。
//! 不认识的包装对象（没有列表键也没有记录字段）按规范化失败处理，不会变成一条默认记录。

use serde_json::Value;

use crate::core::FetchError;
use crate::model::{Announcement, Assignment, CalendarEvent, Course, Discussion, Post};
use crate::normalize::value::{
    collection, expect_object, field, first, kind_of, parse_float, path, pick_text, text, text_or,
    UNKNOWN_COURSE, UNKNOWN_TEACHER, UNTITLED,
};

/// 单条记录至少带其中一个字段；否则视为不认识的包装对象
const RECORD_FIELDS: &[&str] = &["id", "name", "title", "course_name", "original_name"];

/// 取出列表项：依次尝试 keys 作为包装键（操作名在前）；null 与空对象为结构缺失（空列表），
/// 带记录字段的对象为单条记录，其余对象与标量无法恢复
fn items<'a>(payload: &'a Value, keys: &[&str]) -> Result<Vec<&'a Value>, FetchError> {
    let label = keys.first().copied().unwrap_or("items");
    let list = match payload {
        Value::Null => {
            tracing::warn!(entity = label, "empty course system payload");
            return Ok(Vec::new());
        }
        Value::Array(_) => collection(Some(payload), label)?,
        Value::Object(map) => match keys.iter().find(|key| map.contains_key(**key)) {
            Some(key) => collection(field(payload, key), key)?,
            None if map.is_empty() => Vec::new(),
            None if RECORD_FIELDS.iter().any(|f| field(payload, f).is_some()) => vec![payload],
            None => {
                return Err(FetchError::Normalization(format!(
                    "{} payload is an object with neither a list key nor record fields",
                    label
                )))
            }
        },
        other => {
            return Err(FetchError::Normalization(format!(
                "{} payload should be a list or object, found {}",
                label,
                kind_of(other)
            )))
        }
    };
    list.into_iter()
        .map(|item| expect_object(item, label))
        .collect()
}

/// `list[0].key` 形式的嵌套读取
fn first_field<'a>(value: &'a Value, list: &str, key: &str) -> Option<&'a Value> {
    first(field(value, list), list)
        .ok()
        .flatten()
        .and_then(|item| field(item, key))
}

pub fn normalize_courses(payload: &Value) -> Result<Vec<Course>, FetchError> {
    Ok(items(payload, &["courses"])?.into_iter().map(course).collect())
}

fn course(value: &Value) -> Course {
    let teacher = first_field(value, "teachers", "display_name")
        .and_then(text)
        .or_else(|| pick_text(value, &["teacher_name", "teacher"]))
        .unwrap_or_else(|| UNKNOWN_TEACHER.to_string());
    let grade = first_field(value, "enrollments", "computed_current_grade")
        .and_then(text)
        .or_else(|| pick_text(value, &["current_grade", "grade"]))
        .unwrap_or_default();
    let percentage = parse_float(
        first_field(value, "enrollments", "computed_current_score").or_else(|| {
            ["current_score", "score"]
                .iter()
                .find_map(|key| field(value, key))
        }),
    );

    Course {
        id: text_or(value, &["id"], ""),
        name: text_or(
            value,
            &["name", "course_name", "original_name", "course_code"],
            UNKNOWN_COURSE,
        ),
        teacher,
        period: text_or(value, &["period", "course_code"], ""),
        grade,
        percentage,
        assignments: Vec::new(),
    }
}

pub fn normalize_assignments(payload: &Value) -> Result<Vec<Assignment>, FetchError> {
    Ok(items(payload, &["assignments"])?
        .into_iter()
        .map(assignment)
        .collect())
}

fn assignment(value: &Value) -> Assignment {
    let score = parse_float(path(value, &["submission", "score"]).or_else(|| field(value, "score")));
    let max_score = parse_float(["points_possible", "max_score"].iter().find_map(|k| field(value, k)));
    Assignment {
        name: text_or(value, &["name", "title"], UNTITLED),
        score,
        max_score,
        due_date: text_or(value, &["due_at", "due_date", "dueDate"], ""),
        category: text_or(value, &["assignment_group_name", "category"], ""),
        context_id: text_or(value, &["course_id", "context_id"], ""),
        notes: pick_text(value, &["description"]),
    }
}

pub fn normalize_calendar_events(payload: &Value) -> Result<Vec<CalendarEvent>, FetchError> {
    Ok(items(payload, &["calendar", "events"])?
        .into_iter()
        .map(|v| CalendarEvent {
            id: text_or(v, &["id"], ""),
            title: text_or(v, &["title", "name"], UNTITLED),
            start: text_or(v, &["start_at", "start"], ""),
            end: text_or(v, &["end_at", "end"], ""),
            context_id: text_or(v, &["context_code", "course_id"], ""),
            body: text_or(v, &["description"], ""),
        })
        .collect())
}

pub fn normalize_discussions(payload: &Value) -> Result<Vec<Discussion>, FetchError> {
    Ok(items(payload, &["discussions"])?.into_iter().map(post).collect())
}

pub fn normalize_announcements(payload: &Value) -> Result<Vec<Announcement>, FetchError> {
    Ok(items(payload, &["announcements"])?
        .into_iter()
        .map(post)
        .collect())
}

fn post(value: &Value) -> Post {
    Post {
        id: text_or(value, &["id"], ""),
        title: text_or(value, &["title"], UNTITLED),
        posted_at: text_or(value, &["posted_at", "created_at"], ""),
        last_activity_at: text_or(value, &["last_reply_at"], ""),
        context_id: text_or(value, &["context_code", "course_id"], ""),
        author: path(value, &["author", "display_name"])
            .and_then(text)
            .or_else(|| pick_text(value, &["user_name"]))
            .unwrap_or_default(),
        body: text_or(value, &["message"], ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_courses_from_enrollments() {
        let payload = json!([{
            "id": 101,
            "name": "AP Physics",
            "course_code": "PHYS-AP",
            "teachers": [{"display_name": "Mr. Newton"}],
            "enrollments": [{"computed_current_score": 87.25, "computed_current_grade": "B+"}]
        }]);
        let courses = normalize_courses(&payload).unwrap();
        assert_eq!(courses.len(), 1);
        let c = &courses[0];
        assert_eq!(c.id, "101");
        assert_eq!(c.name, "AP Physics");
        assert_eq!(c.teacher, "Mr. Newton");
        assert_eq!(c.period, "PHYS-AP");
        assert_eq!(c.grade, "B+");
        assert_eq!(c.percentage, 87.25);
    }

    #[test]
    fn test_course_fallbacks() {
        let payload = json!({"courses": {"original_name": "Latin", "current_score": "x"}});
        let c = &normalize_courses(&payload).unwrap()[0];
        assert_eq!(c.name, "Latin");
        assert_eq!(c.teacher, "Unknown Teacher");
        assert_eq!(c.grade, "");
        assert_eq!(c.percentage, 0.0);

        let c = &normalize_courses(&json!({"id": 1})).unwrap()[0];
        assert_eq!(c.name, "Unknown Course");
    }

    #[test]
    fn test_null_payload_is_empty_and_scalar_fails() {
        assert!(normalize_courses(&json!(null)).unwrap().is_empty());
        assert!(normalize_courses(&json!({"courses": null})).unwrap().is_empty());
        assert!(normalize_courses(&json!("nope")).is_err());
        assert!(normalize_courses(&json!([1])).is_err());
    }

    #[test]
    fn test_assignments() {
        let payload = json!({"assignments": [
            {"name": "Lab 1", "points_possible": 20, "due_at": "2024-09-01T23:59:00Z",
             "course_id": 101, "submission": {"score": 18.5}},
            {"title": "Essay", "score": "7", "max_score": "10", "description": "500 words"}
        ]});
        let out = normalize_assignments(&payload).unwrap();
        assert_eq!(out[0].score, 18.5);
        assert_eq!(out[0].max_score, 20.0);
        assert_eq!(out[0].context_id, "101");
        assert_eq!(out[0].notes, None);
        assert_eq!(out[1].name, "Essay");
        assert_eq!(out[1].score, 7.0);
        assert_eq!(out[1].notes.as_deref(), Some("500 words"));
    }

    #[test]
    fn test_calendar_events_single_object() {
        let payload = json!({"id": 5, "title": "Field trip", "start_at": "2024-10-01",
                             "context_code": "course_101"});
        let out = normalize_calendar_events(&payload).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].context_id, "course_101");
        assert_eq!(out[0].end, "");
    }

    #[test]
    fn test_calendar_wrapped_under_operation_key() {
        let payload = json!({"calendar": [{"id": 1, "title": "Exam"}, {"id": 2, "title": "Trip"}]});
        let out = normalize_calendar_events(&payload).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, "Exam");
        assert_eq!(out[1].id, "2");

        let legacy = json!({"events": [{"id": 3, "title": "Play"}]});
        assert_eq!(normalize_calendar_events(&legacy).unwrap()[0].title, "Play");
    }

    #[test]
    fn test_unknown_wrapper_is_not_a_record() {
        let payload = json!({"data": [{"id": 1, "name": "Biology", "current_score": 91}]});
        let err = normalize_courses(&payload).unwrap_err();
        assert!(matches!(err, FetchError::Normalization(_)));
        assert!(normalize_calendar_events(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_posts() {
        let payload = json!([{"id": 9, "title": "Welcome", "posted_at": "2024-08-20",
                              "message": "<p>Hi</p>", "author": {"display_name": "Ms. A"},
                              "context_code": "course_7"}]);
        let a = &normalize_announcements(&payload).unwrap()[0];
        assert_eq!(a.author, "Ms. A");
        assert_eq!(a.body, "<p>Hi</p>");
        let d = &normalize_discussions(&json!([{"user_name": "bob"}])).unwrap()[0];
        assert_eq!(d.title, "Untitled");
        assert_eq!(d.author, "bob");
    }
}
