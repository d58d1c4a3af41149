//! iCalendar export of the daily schedule

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

use crate::schedule::ScheduleItem;

const PRODID: &str = "-//LOCK IN//AI Schedule//EN";
const UID_DOMAIN: &str = "lockin.ai";

/// Suggested file name for an export of `date`
pub fn ics_filename(date: NaiveDate) -> String {
    format!("lockin-mission-{}.ics", date.format("%Y-%m-%d"))
}

/// Render the schedule as a VCALENDAR document for `date`
///
/// Times are floating local times. Slots whose end is before their start
/// finish on the following day. Slots that cannot be parsed are skipped.
pub fn export_ics(schedule: &[ScheduleItem], date: NaiveDate, stamp: DateTime<Utc>) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODID),
        "CALSCALE:GREGORIAN".to_string(),
    ];

    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();

    for item in schedule {
        let slot = match item.parsed_slot() {
            Ok(slot) => slot,
            Err(e) => {
                warn!(id = %item.id, slot = %item.time_slot, error = %e, "Skipping schedule item in export");
                continue;
            }
        };

        let start = NaiveDateTime::new(date, slot.start);
        let mut end = NaiveDateTime::new(date, slot.end);
        if slot.crosses_midnight() {
            end += Duration::days(1);
        }

        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}@{}", item.id, UID_DOMAIN));
        lines.push(format!("DTSTAMP:{}", dtstamp));
        lines.push(format!("DTSTART:{}", local_stamp(start)));
        lines.push(format!("DTEND:{}", local_stamp(end)));
        lines.push(format!(
            "SUMMARY:{}",
            escape_text(&format!("{} ({})", item.title, item.category))
        ));
        lines.push(format!("DESCRIPTION:{}", escape_text(&item.description)));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());

    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

fn local_stamp(at: NaiveDateTime) -> String {
    at.format("%Y%m%dT%H%M00").to_string()
}

/// Escape TEXT values (RFC 5545, 3.3.11)
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}
