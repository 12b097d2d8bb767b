// libs/scheduling-cell/src/engine/exclusions.rs
use chrono::{NaiveDate, NaiveTime, Weekday};

use crate::models::{BreakWindow, VacationSpan};

/// Whether the date falls inside any clinic-wide or professional vacation.
/// Vacation ranges are closed on both ends; empty lists mean no exclusions.
pub fn is_date_excluded(
    date: NaiveDate,
    clinic_vacations: &[VacationSpan],
    professional_vacations: &[VacationSpan],
) -> bool {
    let in_span = |v: &VacationSpan| date >= v.start_date && date <= v.end_date;

    clinic_vacations.iter().any(in_span) || professional_vacations.iter().any(in_span)
}

/// Whether a candidate start time lands inside a recurring break on the given
/// weekday. Break windows are half-open: a slot starting exactly at the end
/// of a break is allowed.
pub fn is_time_in_break(weekday: Weekday, time: NaiveTime, breaks: &[BreakWindow]) -> bool {
    breaks.iter().any(|b| {
        b.applies_on(weekday) && time >= b.start_time && time < b.end_time
    })
}
