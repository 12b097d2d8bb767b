// libs/appointment-cell/src/services/meeting.rs
//
// Online sessions get an opaque meeting URL stored on the appointment row.
// The URL is never interpreted beyond extracting the room slug for display.

use rand::Rng;
use rand::distributions::Alphanumeric;

const ROOM_SLUG_LENGTH: usize = 16;

/// Build a fresh meeting URL under the configured base, with an unguessable
/// room slug.
pub fn generate_meeting_url(base_url: &str) -> String {
    let slug: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ROOM_SLUG_LENGTH)
        .map(char::from)
        .collect();

    format!("{}/{}", base_url.trim_end_matches('/'), slug)
}

/// Last path segment of a meeting URL, for display purposes only
/// (`https://meet.jit.si/abc123` -> `abc123`). Query strings and fragments
/// are ignored.
pub fn room_name_from_url(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let after_scheme = without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query);

    let mut parts = after_scheme.trim_end_matches('/').splitn(2, '/');
    let _host = parts.next()?;
    let path = parts.next()?;

    let segment = path.rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }

    Some(segment.to_string())
}

/// Plain-text appointment summary for the clipboard/share surfaces.
pub fn share_message(
    client_name: &str,
    professional_name: &str,
    date_display: &str,
    time_display: &str,
    duration_minutes: i64,
    location: &str,
    meeting_url: Option<&str>,
) -> String {
    let mut message = format!(
        "Appointment Details\n\n\
         Client: {}\n\
         Professional: {}\n\
         Date: {}\n\
         Time: {} ({} min)\n\
         Location: {}\n",
        client_name, professional_name, date_display, time_display, duration_minutes, location
    );

    if let Some(url) = meeting_url {
        message.push_str(&format!("\nJoin the meeting:\n{}\n", url));
    }

    message
}
