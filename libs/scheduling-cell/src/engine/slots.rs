// libs/scheduling-cell/src/engine/slots.rs
use chrono::{Datelike, Duration, NaiveTime};

use crate::models::{EngineError, SlotRequest};

use super::exclusions::is_time_in_break;

/// Enumerate the bookable start times of one day.
///
/// Steps through the effective window at the request's granularity and keeps
/// every candidate whose full session fits inside the window, does not start
/// in the past, does not start inside a break, and does not overlap an
/// existing non-cancelled appointment of the professional. Overlap uses
/// half-open `[start, end)` intervals, so a session ending exactly when a
/// booking starts is not a conflict.
///
/// An empty result means "no availability that day". The only error is a
/// non-positive duration or granularity, which would never terminate.
pub fn generate_slots(request: &SlotRequest) -> Result<Vec<NaiveTime>, EngineError> {
    if request.duration_minutes <= 0 || request.granularity_minutes <= 0 {
        return Err(EngineError::InvalidDuration);
    }

    let duration = Duration::minutes(request.duration_minutes);
    let granularity = Duration::minutes(request.granularity_minutes);
    let weekday = request.date.weekday();

    let window_opening = request.date.and_time(request.window.opening).and_utc();
    let window_closing = request.date.and_time(request.window.closing).and_utc();

    let mut slots = Vec::new();
    let mut current = window_opening;

    while current <= window_closing {
        let slot_end = current + duration;

        // No room left for a full session; later candidates only end later.
        if slot_end > window_closing {
            break;
        }

        let time = current.time();

        if let Some(cutoff) = request.not_before {
            if time < cutoff {
                current += granularity;
                continue;
            }
        }

        if is_time_in_break(weekday, time, request.breaks) {
            current += granularity;
            continue;
        }

        let has_conflict = request.booked.iter().any(|booking| {
            current < booking.end_time && slot_end > booking.start_time
        });

        if !has_conflict {
            slots.push(time);
        }

        current += granularity;
    }

    Ok(slots)
}

/// Render engine output the way the pickers consume it.
pub fn format_slot(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
