use assert_matches::assert_matches;
use chrono::NaiveDate;
use uuid::Uuid;

use appointment_cell::models::{
    AppointmentError, ClientFeeConfig, CreateAppointmentRequest, Recurrence, RecurrenceFrequency,
};
use appointment_cell::services::booking::expand_recurrence;
use appointment_cell::services::meeting;

fn base_request() -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        client_id: Some(Uuid::new_v4()),
        professional_id: Some(Uuid::new_v4()),
        date: Some(NaiveDate::from_ymd_opt(2027, 8, 10).unwrap()),
        time: Some("10:00".to_string()),
        duration_minutes: Some(45),
        room_id: Some(Uuid::new_v4()),
        is_online: Some(false),
        notes: None,
        recurrence: None,
    }
}

// ==============================================================================
// VALIDATION
// ==============================================================================

#[test]
fn missing_client_is_rejected() {
    let request = CreateAppointmentRequest {
        client_id: None,
        ..base_request()
    };

    assert_matches!(
        request.validate(),
        Err(AppointmentError::MissingRequiredField("client_id"))
    );
}

#[test]
fn missing_time_is_rejected() {
    let request = CreateAppointmentRequest {
        time: None,
        ..base_request()
    };
    assert_matches!(
        request.validate(),
        Err(AppointmentError::MissingRequiredField("time"))
    );

    // An empty string is as missing as an absent field.
    let request = CreateAppointmentRequest {
        time: Some(String::new()),
        ..base_request()
    };
    assert_matches!(
        request.validate(),
        Err(AppointmentError::MissingRequiredField("time"))
    );
}

#[test]
fn physical_booking_requires_a_room() {
    let request = CreateAppointmentRequest {
        room_id: None,
        is_online: Some(false),
        ..base_request()
    };

    assert_matches!(
        request.validate(),
        Err(AppointmentError::MissingRequiredField("room_id"))
    );
}

#[test]
fn online_booking_needs_no_room_and_clears_any_chosen_one() {
    let request = CreateAppointmentRequest {
        is_online: Some(true),
        ..base_request()
    };

    let booking = request.validate().unwrap();
    assert!(booking.is_online);
    assert_eq!(booking.room_id, None);
}

#[test]
fn non_positive_duration_is_rejected() {
    let request = CreateAppointmentRequest {
        duration_minutes: Some(0),
        ..base_request()
    };

    assert_matches!(request.validate(), Err(AppointmentError::InvalidTime(_)));
}

#[test]
fn end_time_is_start_plus_duration() {
    let booking = base_request().validate().unwrap();

    assert_eq!(booking.end_time - booking.start_time, chrono::Duration::minutes(45));
    assert_eq!(booking.start_time.format("%H:%M").to_string(), "10:00");
}

#[test]
fn zero_recurrence_count_is_rejected() {
    let request = CreateAppointmentRequest {
        recurrence: Some(Recurrence { frequency: RecurrenceFrequency::Weekly, count: 0 }),
        ..base_request()
    };

    assert_matches!(request.validate(), Err(AppointmentError::ValidationError(_)));
}

// ==============================================================================
// RECURRENCE EXPANSION
// ==============================================================================

#[test]
fn weekly_recurrence_advances_seven_days_per_occurrence() {
    let request = CreateAppointmentRequest {
        recurrence: Some(Recurrence { frequency: RecurrenceFrequency::Weekly, count: 3 }),
        ..base_request()
    };
    let booking = request.validate().unwrap();

    let drafts = expand_recurrence(&booking, "https://meet.jit.si").unwrap();

    assert_eq!(drafts.len(), 3);
    assert_eq!(drafts[0]["start_time"], "2027-08-10T10:00:00+00:00");
    assert_eq!(drafts[1]["start_time"], "2027-08-17T10:00:00+00:00");
    assert_eq!(drafts[2]["start_time"], "2027-08-24T10:00:00+00:00");

    // Each occurrence recomputes its end from the duration.
    assert_eq!(drafts[2]["end_time"], "2027-08-24T10:45:00+00:00");
    for draft in &drafts {
        assert_eq!(draft["status"], "scheduled");
    }
}

#[test]
fn monthly_recurrence_advances_one_calendar_month() {
    let request = CreateAppointmentRequest {
        recurrence: Some(Recurrence { frequency: RecurrenceFrequency::Monthly, count: 3 }),
        ..base_request()
    };
    let booking = request.validate().unwrap();

    let drafts = expand_recurrence(&booking, "https://meet.jit.si").unwrap();

    assert_eq!(drafts[0]["start_time"], "2027-08-10T10:00:00+00:00");
    assert_eq!(drafts[1]["start_time"], "2027-09-10T10:00:00+00:00");
    assert_eq!(drafts[2]["start_time"], "2027-10-10T10:00:00+00:00");
}

#[test]
fn single_booking_expands_to_one_draft_without_meeting_url() {
    let booking = base_request().validate().unwrap();

    let drafts = expand_recurrence(&booking, "https://meet.jit.si").unwrap();

    assert_eq!(drafts.len(), 1);
    assert!(drafts[0]["meeting_url"].is_null());
    assert!(drafts[0]["room_id"].is_string());
}

#[test]
fn online_occurrences_each_get_their_own_meeting_url() {
    let request = CreateAppointmentRequest {
        is_online: Some(true),
        recurrence: Some(Recurrence { frequency: RecurrenceFrequency::Weekly, count: 2 }),
        ..base_request()
    };
    let booking = request.validate().unwrap();

    let drafts = expand_recurrence(&booking, "https://meet.jit.si").unwrap();

    let first = drafts[0]["meeting_url"].as_str().unwrap();
    let second = drafts[1]["meeting_url"].as_str().unwrap();

    assert!(first.starts_with("https://meet.jit.si/"));
    assert_ne!(first, second);
    assert!(drafts[0]["room_id"].is_null());
}

// ==============================================================================
// BACKEND ERROR MAPPING
// ==============================================================================

#[test]
fn backend_constraint_messages_map_to_user_facing_errors() {
    assert_matches!(
        AppointmentError::from_backend("API error (409): Room is already booked for this time"),
        AppointmentError::ConflictDetected(_)
    );
    assert_matches!(
        AppointmentError::from_backend("Professional already has an appointment in this window"),
        AppointmentError::ConflictDetected(_)
    );
    assert_matches!(
        AppointmentError::from_backend("Cannot create appointments in the past"),
        AppointmentError::InvalidTime(_)
    );
    assert_matches!(
        AppointmentError::from_backend("connection reset by peer"),
        AppointmentError::DatabaseError(_)
    );
}

// ==============================================================================
// PAYMENT SPLIT
// ==============================================================================

#[test]
fn session_fee_splits_by_share_percentages() {
    let config = ClientFeeConfig {
        session_fee: 200.0,
        professional_share_percentage: 60.0,
        clinic_share_percentage: 40.0,
    };

    let (professional_amount, clinic_amount) = config.split();

    assert_eq!(professional_amount, 120.0);
    assert_eq!(clinic_amount, 80.0);
}

// ==============================================================================
// MEETING LINKS
// ==============================================================================

#[test]
fn generated_meeting_urls_are_unique_and_under_the_base() {
    let first = meeting::generate_meeting_url("https://meet.jit.si");
    let second = meeting::generate_meeting_url("https://meet.jit.si/");

    assert!(first.starts_with("https://meet.jit.si/"));
    assert!(second.starts_with("https://meet.jit.si/"));
    assert!(!second.contains("//jit"));
    assert_ne!(first, second);
}

#[test]
fn room_name_is_the_last_path_segment() {
    assert_eq!(
        meeting::room_name_from_url("https://meet.jit.si/abc123").as_deref(),
        Some("abc123")
    );
    assert_eq!(
        meeting::room_name_from_url("https://meet.jit.si/abc123?jwt=x#config").as_deref(),
        Some("abc123")
    );
    assert_eq!(meeting::room_name_from_url("https://meet.jit.si"), None);
    assert_eq!(meeting::room_name_from_url("https://meet.jit.si/"), None);
}

#[test]
fn share_message_carries_the_meeting_link() {
    let message = meeting::share_message(
        "Jane Doe",
        "Dr. Smith",
        "2027-08-10",
        "10:00",
        45,
        "Online meeting",
        Some("https://meet.jit.si/abc123"),
    );

    assert!(message.contains("Jane Doe"));
    assert!(message.contains("Dr. Smith"));
    assert!(message.contains("10:00 (45 min)"));
    assert!(message.contains("https://meet.jit.si/abc123"));

    let without_link = meeting::share_message(
        "Jane Doe", "Dr. Smith", "2027-08-10", "10:00", 45, "Room A", None,
    );
    assert!(!without_link.contains("Join the meeting"));
}
