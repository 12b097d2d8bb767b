// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::fmt;

use scheduling_cell::models::parse_clock_time;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub professional_id: Uuid,
    pub room_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub is_online: bool,
    pub meeting_url: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: RecurrenceFrequency,
    pub count: u32,
}

/// Booking form as it comes off the wire. Everything is optional so that a
/// half-filled form yields a field-level error instead of a deserialization
/// failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAppointmentRequest {
    pub client_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    /// Chosen slot, "HH:MM".
    pub time: Option<String>,
    pub duration_minutes: Option<i64>,
    pub room_id: Option<Uuid>,
    pub is_online: Option<bool>,
    pub notes: Option<String>,
    pub recurrence: Option<Recurrence>,
}

/// A fully validated booking candidate, ready for the availability re-check
/// and persistence.
#[derive(Debug, Clone)]
pub struct ValidatedBooking {
    pub client_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub room_id: Option<Uuid>,
    pub is_online: bool,
    pub notes: Option<String>,
    pub recurrence: Option<Recurrence>,
}

pub const DEFAULT_SESSION_MINUTES: i64 = 45;

impl CreateAppointmentRequest {
    pub fn validate(self) -> Result<ValidatedBooking, AppointmentError> {
        let client_id = self.client_id
            .ok_or(AppointmentError::MissingRequiredField("client_id"))?;
        let professional_id = self.professional_id
            .ok_or(AppointmentError::MissingRequiredField("professional_id"))?;
        let date = self.date
            .ok_or(AppointmentError::MissingRequiredField("date"))?;
        let time = self.time
            .filter(|t| !t.is_empty())
            .ok_or(AppointmentError::MissingRequiredField("time"))?;

        let is_online = self.is_online.unwrap_or(false);
        if !is_online && self.room_id.is_none() {
            return Err(AppointmentError::MissingRequiredField("room_id"));
        }

        let duration_minutes = self.duration_minutes.unwrap_or(DEFAULT_SESSION_MINUTES);
        if duration_minutes <= 0 {
            return Err(AppointmentError::InvalidTime(
                "Session duration must be positive".to_string(),
            ));
        }

        let start_of_day = parse_clock_time(&time)
            .ok_or_else(|| AppointmentError::InvalidTime(format!("Unparseable time: {}", time)))?;
        let start_time = date.and_time(start_of_day).and_utc();
        let end_time = start_time + Duration::minutes(duration_minutes);

        if let Some(ref recurrence) = self.recurrence {
            if recurrence.count == 0 {
                return Err(AppointmentError::ValidationError(
                    "Recurrence count must be at least 1".to_string(),
                ));
            }
        }

        // An online session never occupies a physical room.
        let room_id = if is_online { None } else { self.room_id };

        Ok(ValidatedBooking {
            client_id,
            professional_id,
            date,
            time,
            start_time,
            end_time,
            duration_minutes,
            room_id,
            is_online,
            notes: self.notes,
            recurrence: self.recurrence,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
    /// Reverting a completed appointment deletes its payment record; the
    /// caller must acknowledge that explicitly.
    pub confirm_payment_removal: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentSearchQuery {
    pub client_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub limit: Option<i32>,
}

// ==============================================================================
// PAYMENTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub professional_id: Uuid,
    pub amount: f64,
    pub professional_amount: f64,
    pub clinic_amount: f64,
    pub payment_status: String,
    pub collected_by: String,
    pub payment_date: DateTime<Utc>,
}

/// Fee configuration carried on the client record.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ClientFeeConfig {
    pub session_fee: f64,
    pub professional_share_percentage: f64,
    pub clinic_share_percentage: f64,
}

impl ClientFeeConfig {
    /// Split the session fee between professional and clinic.
    pub fn split(&self) -> (f64, f64) {
        let professional_amount = self.session_fee * self.professional_share_percentage / 100.0;
        let clinic_amount = self.session_fee * self.clinic_share_percentage / 100.0;
        (professional_amount, clinic_amount)
    }
}

// ==============================================================================
// SHARING
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentShare {
    pub appointment_id: Uuid,
    pub message: String,
    pub meeting_url: Option<String>,
    pub meeting_room: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("The selected time slot is no longer available")]
    SlotNotAvailable,

    #[error("The selected room is no longer available")]
    RoomNotAvailable,

    #[error("{0}")]
    ConflictDetected(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AppointmentError {
    /// Map the backend's constraint-violation messages onto user-facing
    /// errors; anything unrecognized is surfaced verbatim as a database
    /// failure.
    pub fn from_backend(message: &str) -> Self {
        if message.contains("Cannot create appointments in the past") {
            AppointmentError::InvalidTime(
                "Appointments cannot be created in the past".to_string(),
            )
        } else if message.contains("Room is already booked") {
            AppointmentError::ConflictDetected(
                "The room is already booked for another appointment at this time".to_string(),
            )
        } else if message.contains("Professional already has an appointment") {
            AppointmentError::ConflictDetected(
                "The professional already has an appointment at this time".to_string(),
            )
        } else {
            AppointmentError::DatabaseError(message.to_string())
        }
    }
}
