// libs/scheduling-cell/src/engine/rooms.rs
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{BookedInterval, Room};

/// Filter the room list down to rooms free of conflicting bookings in
/// `[start, end)`, preserving the input order.
///
/// Bookings of `exclude_professional` are skipped: that professional's own
/// schedule was already enforced by slot generation, and rooms are shared
/// across professionals, so a room conflict here is cross-professional by
/// definition.
pub fn available_rooms(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    rooms: &[Room],
    bookings: &[BookedInterval],
    exclude_professional: Option<Uuid>,
) -> Vec<Room> {
    rooms
        .iter()
        .filter(|room| {
            !bookings.iter().any(|booking| {
                if booking.room_id != Some(room.id) {
                    return false;
                }
                if exclude_professional == Some(booking.professional_id) {
                    return false;
                }
                start < booking.end_time && end > booking.start_time
            })
        })
        .cloned()
        .collect()
}
