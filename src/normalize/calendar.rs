//! 学生信息系统日历 → 作业
//!
//! 两种信封：`CalendarListing.EventLists.EventList`（DayType 属性）与
//! `Calendar.Events.Event`（type 字段）。只保留 assignment / homework 类事件。

use serde_json::Value;

use crate::core::FetchError;
use crate::model::Assignment;
use crate::normalize::value::{
    collection, expect_object, field, path, pick_text, root_object, text_or, UNTITLED,
};

const ASSIGNMENT_MARKERS: [&str; 2] = ["assignment", "homework"];

pub fn normalize_calendar_assignments(payload: &Value) -> Result<Vec<Assignment>, FetchError> {
    let Some(root) = root_object(payload, "calendar")? else {
        tracing::warn!(entity = "calendar", "empty calendar payload");
        return Ok(Vec::new());
    };

    let events = if field(root, "CalendarListing").is_some() {
        collection(
            path(root, &["CalendarListing", "EventLists", "EventList"]),
            "CalendarListing.EventLists.EventList",
        )?
    } else if field(root, "Calendar").is_some() {
        collection(
            path(root, &["Calendar", "Events", "Event"]),
            "Calendar.Events.Event",
        )?
    } else {
        tracing::warn!(entity = "calendar", "unrecognized calendar envelope");
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for event in events {
        let event = expect_object(event, "calendar event")?;
        let kind = text_or(event, &["DayType", "type", "Type"], "");
        if !is_assignment(&kind) {
            continue;
        }
        out.push(Assignment {
            name: text_or(event, &["Title", "title"], UNTITLED),
            score: 0.0,
            max_score: 0.0,
            due_date: text_or(event, &["Date", "date"], ""),
            category: kind,
            context_id: text_or(event, &["Course", "course"], ""),
            notes: pick_text(event, &["Notes", "description"]),
        });
    }
    Ok(out)
}

fn is_assignment(kind: &str) -> bool {
    let kind = kind.to_lowercase();
    ASSIGNMENT_MARKERS.iter().any(|m| kind.contains(m))
}
