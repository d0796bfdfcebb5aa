//! 学生信息系统成绩册 → Course / Assignment
//!
//! 只取每门课的第一个 Mark（当前评分期）。

use serde_json::Value;

use crate::core::FetchError;
use crate::model::{Assignment, Course};
use crate::normalize::value::{
    collection, expect_object, field, first, parse_ratio, path, pick_float, pick_text, root_object,
    text, text_or, UNKNOWN_COURSE, UNKNOWN_TEACHER, UNTITLED,
};

/// `Gradebook.Courses.Course` 缺失时返回空列表并告警
pub fn normalize_gradebook(payload: &Value) -> Result<Vec<Course>, FetchError> {
    let Some(root) = root_object(payload, "gradebook")? else {
        tracing::warn!(entity = "gradebook", "empty gradebook payload");
        return Ok(Vec::new());
    };
    let Some(courses) = path(root, &["Gradebook", "Courses", "Course"]) else {
        tracing::warn!(entity = "gradebook", "no Gradebook.Courses.Course container");
        return Ok(Vec::new());
    };
    collection(Some(courses), "Gradebook.Courses.Course")?
        .into_iter()
        .map(course)
        .collect()
}

fn course(value: &Value) -> Result<Course, FetchError> {
    let value = expect_object(value, "gradebook course")?;
    let name = text_or(value, &["Title", "CourseName", "Name"], UNKNOWN_COURSE);
    let mark = first(path(value, &["Marks", "Mark"]), "Marks.Mark")?;

    let (grade, percentage, assignments) = match mark {
        Some(mark) => {
            let mark = expect_object(mark, "mark")?;
            let assignments = collection(
                path(mark, &["Assignments", "Assignment"]),
                "Assignments.Assignment",
            )?
            .into_iter()
            .map(|a| assignment(a, &name))
            .collect::<Result<Vec<_>, _>>()?;
            (
                text_or(mark, &["CalculatedScoreString", "MarkName"], ""),
                pick_float(mark, &["CalculatedScoreRaw", "Percentage"]),
                assignments,
            )
        }
        None => (String::new(), 0.0, Vec::new()),
    };

    Ok(Course {
        id: String::new(),
        teacher: text_or(value, &["Staff", "Teacher", "StaffName"], UNKNOWN_TEACHER),
        period: text_or(value, &["Period"], ""),
        name,
        grade,
        percentage,
        assignments,
    })
}

fn assignment(value: &Value, course_name: &str) -> Result<Assignment, FetchError> {
    let value = expect_object(value, "gradebook assignment")?;
    let ratio = ["Points", "Score"]
        .iter()
        .find_map(|key| field(value, key).and_then(text).and_then(|t| parse_ratio(&t)));
    let (score, max_score) = ratio.unwrap_or_else(|| {
        (
            pick_float(value, &["Score"]),
            pick_float(value, &["PointPossible", "MaxScore"]),
        )
    });

    Ok(Assignment {
        name: text_or(value, &["Measure", "Name", "Title"], UNTITLED),
        score,
        max_score,
        due_date: text_or(value, &["DueDate", "Date"], ""),
        category: text_or(value, &["Type", "Category"], ""),
        context_id: course_name.to_string(),
        notes: pick_text(value, &["Notes"]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn algebra() -> Value {
        json!({
            "@Title": "Algebra II",
            "@Period": "2",
            "@Staff": "Ms. Smith",
            "Marks": {
                "Mark": [
                    {
                        "@MarkName": "Q1",
                        "@CalculatedScoreString": "A-",
                        "@CalculatedScoreRaw": "91.4",
                        "Assignments": {
                            "Assignment": {
                                "@Measure": "Quiz 1",
                                "@Type": "Quiz",
                                "@DueDate": "9/12/2024",
                                "@Score": "9 out of 10",
                                "@Points": "9.00 / 10.0000",
                                "@Notes": ""
                            }
                        }
                    },
                    { "@MarkName": "Q2", "@CalculatedScoreRaw": "50" }
                ]
            }
        })
    }

    #[test]
    fn test_missing_container_returns_empty() {
        assert!(normalize_gradebook(&json!({})).unwrap().is_empty());
        assert!(normalize_gradebook(&json!({"Gradebook": {}})).unwrap().is_empty());
        assert!(normalize_gradebook(&json!({"Gradebook": {"Courses": ""}}))
            .unwrap()
            .is_empty());
        assert!(normalize_gradebook(&json!(null)).unwrap().is_empty());
    }

    #[test]
    fn test_single_course_equals_array_wrapped() {
        let single = json!({"Gradebook": {"Courses": {"Course": algebra()}}});
        let wrapped = json!({"Gradebook": {"Courses": {"Course": [algebra()]}}});
        let a = normalize_gradebook(&single).unwrap();
        let b = normalize_gradebook(&wrapped).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_first_mark_only() {
        let payload = json!({"Gradebook": {"Courses": {"Course": [algebra()]}}});
        let course = &normalize_gradebook(&payload).unwrap()[0];
        assert_eq!(course.name, "Algebra II");
        assert_eq!(course.teacher, "Ms. Smith");
        assert_eq!(course.period, "2");
        assert_eq!(course.grade, "A-");
        assert_eq!(course.percentage, 91.4);
        assert_eq!(course.assignments.len(), 1);

        let a = &course.assignments[0];
        assert_eq!(a.name, "Quiz 1");
        assert_eq!(a.score, 9.0);
        assert_eq!(a.max_score, 10.0);
        assert_eq!(a.category, "Quiz");
        assert_eq!(a.context_id, "Algebra II");
        assert_eq!(a.notes, None);
    }

    #[test]
    fn test_fallbacks_and_unparseable_percentage() {
        let payload = json!({"Gradebook": {"Courses": {"Course": {
            "CourseName": "Biology",
            "Marks": {"Mark": {"CalculatedScoreRaw": "N/A", "MarkName": "S1"}}
        }}}});
        let course = &normalize_gradebook(&payload).unwrap()[0];
        assert_eq!(course.name, "Biology");
        assert_eq!(course.teacher, "Unknown Teacher");
        assert_eq!(course.period, "");
        assert_eq!(course.grade, "S1");
        assert_eq!(course.percentage, 0.0);
        assert!(course.assignments.is_empty());
    }

    #[test]
    fn test_course_without_marks() {
        let payload = json!({"Gradebook": {"Courses": {"Course": {}}}});
        let course = &normalize_gradebook(&payload).unwrap()[0];
        assert_eq!(course.name, "Unknown Course");
        assert_eq!(course.grade, "");
        assert_eq!(course.percentage, 0.0);
    }

    #[test]
    fn test_assignment_without_ratio() {
        let payload = json!({"Gradebook": {"Courses": {"Course": {
            "Title": "Art",
            "Marks": {"Mark": {"Assignments": {"Assignment": [
                {"Name": "Sketch", "Score": "Not Graded", "PointPossible": "20", "Notes": "late"}
            ]}}}
        }}}});
        let a = &normalize_gradebook(&payload).unwrap()[0].assignments[0];
        assert_eq!(a.name, "Sketch");
        assert_eq!(a.score, 0.0);
        assert_eq!(a.max_score, 20.0);
        assert_eq!(a.notes.as_deref(), Some("late"));
    }

    #[test]
    fn test_corrupt_structure_is_failure() {
        let payload = json!({"Gradebook": {"Courses": {"Course": 17}}});
        assert!(matches!(
            normalize_gradebook(&payload),
            Err(FetchError::Normalization(_))
        ));
        assert!(normalize_gradebook(&json!("gradebook")).is_err());
        let payload = json!({"Gradebook": {"Courses": {"Course": ["oops"]}}});
        assert!(normalize_gradebook(&payload).is_err());
    }
}
