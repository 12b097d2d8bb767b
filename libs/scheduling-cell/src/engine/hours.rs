// libs/scheduling-cell/src/engine/hours.rs
use crate::models::{DayHours, TimeWindow};

/// Intersect clinic and professional hours for one weekday into the effective
/// opening window.
///
/// A missing side counts as open all day, so an unconfigured scope never
/// blocks booking. Returns `None` when either side is closed or the
/// intersection is empty; an empty window is the "closed today" signal, not
/// an error.
pub fn effective_window(
    clinic_day: Option<&DayHours>,
    professional_day: Option<&DayHours>,
) -> Option<TimeWindow> {
    let permissive = DayHours::permissive();
    let clinic = clinic_day.unwrap_or(&permissive);
    let professional = professional_day.unwrap_or(&permissive);

    if !clinic.is_open || !professional.is_open {
        return None;
    }

    let opening = clinic.opening.max(professional.opening);
    let closing = clinic.closing.min(professional.closing);

    if opening > closing {
        return None;
    }

    Some(TimeWindow { opening, closing })
}
