//! 学生信息系统考勤 → Attendance

use serde_json::Value;

use crate::core::FetchError;
use crate::model::{Absence, AbsencePeriod, Attendance, AttendanceTotals};
use crate::normalize::value::{
    collection, expect_object, field, path, pick_float, root_object, text_or,
};

/// `Attendance` 缺失时返回 None
pub fn normalize_attendance(payload: &Value) -> Result<Option<Attendance>, FetchError> {
    let Some(root) = root_object(payload, "attendance")? else {
        tracing::warn!(entity = "attendance", "empty attendance payload");
        return Ok(None);
    };
    let Some(attendance) = field(root, "Attendance") else {
        tracing::warn!(entity = "attendance", "no Attendance container");
        return Ok(None);
    };
    let attendance = expect_object(attendance, "Attendance")?;

    let absences = collection(path(attendance, &["Absences", "Absence"]), "Absences.Absence")?
        .into_iter()
        .map(absence)
        .collect::<Result<Vec<_>, _>>()?;

    let totals = AttendanceTotals {
        activities: total(attendance, "TotalActivities")?,
        tardies: total(attendance, "TotalTardies")?,
        unexcused: total(attendance, "TotalUnexcused")?,
        unexcused_tardies: total(attendance, "TotalUnexcusedTardies")?,
    };

    Ok(Some(Attendance { totals, absences }))
}

fn absence(value: &Value) -> Result<Absence, FetchError> {
    let value = expect_object(value, "absence")?;
    let periods = collection(path(value, &["Periods", "Period"]), "Periods.Period")?
        .into_iter()
        .map(|p| {
            let p = expect_object(p, "absence period")?;
            Ok(AbsencePeriod {
                number: text_or(p, &["Number"], ""),
                name: text_or(p, &["Name"], ""),
                reason: text_or(p, &["Reason"], ""),
                course: text_or(p, &["Course"], ""),
                staff: text_or(p, &["Staff"], ""),
            })
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    Ok(Absence {
        date: text_or(value, &["AbsenceDate", "Date"], ""),
        reason: text_or(value, &["Reason"], ""),
        note: text_or(value, &["Note"], ""),
        periods,
    })
}

/// 某一类合计：`<kind>.PeriodTotal[].Total` 求和
fn total(attendance: &Value, kind: &str) -> Result<f64, FetchError> {
    let items = collection(path(attendance, &[kind, "PeriodTotal"]), kind)?;
    Ok(items.into_iter().map(|pt| pick_float(pt, &["Total"])).sum())
}
