// libs/appointment-cell/src/services/booking.rs
use chrono::{DateTime, Duration, Months, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use scheduling_cell::models::{DayAvailabilityQuery, RoomAvailabilityQuery};
use scheduling_cell::services::availability::{AvailabilityError, AvailabilityService};

use crate::models::{
    Appointment, AppointmentError, AppointmentSearchQuery, CreateAppointmentRequest,
    RecurrenceFrequency, ValidatedBooking,
};
use crate::services::meeting;

pub struct AppointmentBookingService {
    supabase: SupabaseClient,
    availability: AvailabilityService,
    meet_base_url: String,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            availability: AvailabilityService::new(config),
            meet_base_url: config.meet_base_url.clone(),
        }
    }

    /// Validate a booking candidate against a fresh availability snapshot and
    /// persist it. Recurring bookings expand into one batch insert; the
    /// backend's constraints decide the whole batch (all-or-nothing).
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let booking = request.validate()?;

        debug!(
            "Booking appointment for client {} with professional {} at {} {}",
            booking.client_id, booking.professional_id, booking.date, booking.time
        );

        self.recheck_availability(&booking, auth_token).await?;

        let drafts = expand_recurrence(&booking, &self.meet_base_url)?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/appointments",
            Some(auth_token),
            Some(Value::Array(drafts)),
            Some(headers),
        ).await.map_err(|e| AppointmentError::from_backend(&e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::DatabaseError(
                "Failed to create appointment".to_string(),
            ));
        }

        let appointments: Vec<Appointment> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))?;

        debug!("Created {} appointment(s)", appointments.len());
        Ok(appointments)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(row)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    /// Appointment plus the display names the share surfaces need.
    pub async fn get_appointment_with_names(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(Appointment, String, String), AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&select=*,client:clients(full_name),professional:professionals(full_name)",
            appointment_id
        );
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;

        let client_name = row["client"]["full_name"].as_str().unwrap_or("Unknown").to_string();
        let professional_name = row["professional"]["full_name"].as_str().unwrap_or("Unknown").to_string();

        let appointment: Appointment = serde_json::from_value(row)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))?;

        Ok((appointment, client_name, professional_name))
    }

    pub async fn search_appointments(
        &self,
        query: AppointmentSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut query_parts = Vec::new();

        if let Some(client_id) = query.client_id {
            query_parts.push(format!("client_id=eq.{}", client_id));
        }
        if let Some(professional_id) = query.professional_id {
            query_parts.push(format!("professional_id=eq.{}", professional_id));
        }
        if let Some(status) = query.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(from_date) = query.from_date {
            query_parts.push(format!("start_time=gte.{}", from_date.to_rfc3339()));
        }
        if let Some(to_date) = query.to_date {
            query_parts.push(format!("start_time=lte.{}", to_date.to_rfc3339()));
        }
        query_parts.push(format!("limit={}", query.limit.unwrap_or(100)));

        let path = format!(
            "/rest/v1/appointments?{}&order=start_time.asc",
            query_parts.join("&")
        );

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))
    }

    pub async fn delete_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        debug!("Deleting appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let _: Vec<Value> = self.supabase.request(
            Method::DELETE,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// The engine's output is the source of truth for validity at
    /// confirmation time: the chosen start must still be a bookable slot and
    /// the chosen room must still be free.
    async fn recheck_availability(
        &self,
        booking: &ValidatedBooking,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let day = self.availability.day_availability(
            booking.professional_id,
            DayAvailabilityQuery {
                date: booking.date,
                duration_minutes: Some(booking.duration_minutes),
            },
            auth_token,
        ).await.map_err(map_availability_error)?;

        let normalized_time = booking.start_time.format("%H:%M").to_string();
        if !day.slots.iter().any(|slot| slot == &normalized_time) {
            warn!(
                "Slot {} on {} no longer available for professional {}",
                normalized_time, booking.date, booking.professional_id
            );
            return Err(AppointmentError::SlotNotAvailable);
        }

        if let Some(room_id) = booking.room_id {
            let rooms = self.availability.room_availability(
                booking.professional_id,
                RoomAvailabilityQuery {
                    date: booking.date,
                    time: normalized_time,
                    duration_minutes: Some(booking.duration_minutes),
                },
                auth_token,
            ).await.map_err(map_availability_error)?;

            if !rooms.rooms.iter().any(|room| room.id == room_id) {
                return Err(AppointmentError::RoomNotAvailable);
            }
        }

        Ok(())
    }
}

fn map_availability_error(e: AvailabilityError) -> AppointmentError {
    match e {
        AvailabilityError::Engine(e) => AppointmentError::ValidationError(e.to_string()),
        AvailabilityError::InvalidTime(t) => {
            AppointmentError::InvalidTime(format!("Unparseable time: {}", t))
        }
        AvailabilityError::Database(msg) => AppointmentError::DatabaseError(msg),
    }
}

/// Expand a booking into its occurrence rows. The anchor advances by a fixed
/// period per occurrence (7 days weekly, one calendar month monthly) and the
/// end time is recomputed from the duration each time.
pub fn expand_recurrence(
    booking: &ValidatedBooking,
    meet_base_url: &str,
) -> Result<Vec<Value>, AppointmentError> {
    let count = booking.recurrence.as_ref().map(|r| r.count).unwrap_or(1);
    let frequency = booking.recurrence.as_ref().map(|r| r.frequency);

    let mut drafts = Vec::with_capacity(count as usize);
    let mut current: DateTime<Utc> = booking.start_time;

    for _ in 0..count {
        let end_time = current + Duration::minutes(booking.duration_minutes);

        let meeting_url = if booking.is_online {
            Some(meeting::generate_meeting_url(meet_base_url))
        } else {
            None
        };

        drafts.push(json!({
            "client_id": booking.client_id,
            "professional_id": booking.professional_id,
            "room_id": booking.room_id,
            "start_time": current.to_rfc3339(),
            "end_time": end_time.to_rfc3339(),
            "status": "scheduled",
            "is_online": booking.is_online,
            "meeting_url": meeting_url,
            "notes": booking.notes
        }));

        match frequency {
            Some(RecurrenceFrequency::Weekly) => {
                current += Duration::days(7);
            }
            Some(RecurrenceFrequency::Monthly) => {
                current = current.checked_add_months(Months::new(1)).ok_or_else(|| {
                    AppointmentError::InvalidTime("Recurrence exceeds supported date range".to_string())
                })?;
            }
            None => {}
        }
    }

    Ok(drafts)
}
