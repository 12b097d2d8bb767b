// libs/scheduling-cell/src/services/availability.rs
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::engine;
use crate::models::{
    BookedInterval, BreakWindow, DayAvailability, DayAvailabilityQuery, EngineError,
    Room, RoomAvailability, RoomAvailabilityQuery, SlotRequest, VacationSpan, WeeklyHours,
    parse_clock_time,
};

pub const DEFAULT_SESSION_MINUTES: i64 = 45;
pub const SLOT_GRANULARITY_MINUTES: i64 = 15;

#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Snapshot of everything one availability computation reads. Loaded fresh
/// per request; every field degrades independently so one failed lookup does
/// not take the whole view down.
#[derive(Debug, Default)]
pub struct AvailabilityContext {
    pub clinic_hours: Option<WeeklyHours>,
    pub professional_hours: Option<WeeklyHours>,
    pub clinic_breaks: Vec<BreakWindow>,
    pub professional_breaks: Vec<BreakWindow>,
    pub clinic_vacations: Vec<VacationSpan>,
    pub professional_vacations: Vec<VacationSpan>,
    pub appointments: Vec<BookedInterval>,
}

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Bookable start times for one professional on one day.
    pub async fn day_availability(
        &self,
        professional_id: Uuid,
        query: DayAvailabilityQuery,
        auth_token: &str,
    ) -> Result<DayAvailability, AvailabilityError> {
        let duration = query.duration_minutes.unwrap_or(DEFAULT_SESSION_MINUTES);
        debug!(
            "Computing availability for professional {} on {} ({} min sessions)",
            professional_id, query.date, duration
        );

        let ctx = self.load_context(professional_id, query.date, auth_token).await;

        Ok(compute_day_availability(&ctx, professional_id, query.date, duration, Utc::now())?)
    }

    /// Rooms free of conflicting bookings for a chosen start time.
    pub async fn room_availability(
        &self,
        professional_id: Uuid,
        query: RoomAvailabilityQuery,
        auth_token: &str,
    ) -> Result<RoomAvailability, AvailabilityError> {
        let duration = query.duration_minutes.unwrap_or(DEFAULT_SESSION_MINUTES);
        if duration <= 0 {
            return Err(EngineError::InvalidDuration.into());
        }

        let time = parse_clock_time(&query.time)
            .ok_or_else(|| AvailabilityError::InvalidTime(query.time.clone()))?;

        let start = query.date.and_time(time).and_utc();
        let end = start + Duration::minutes(duration);

        let assistant_id = self.resolve_assistant_id(professional_id, auth_token).await;
        let (rooms, bookings) = tokio::join!(
            self.load_rooms(assistant_id.as_deref(), auth_token),
            self.load_room_bookings(query.date, auth_token),
        );

        let rooms = engine::available_rooms(start, end, &rooms, &bookings, Some(professional_id));

        Ok(RoomAvailability {
            date: query.date,
            start_time: start,
            end_time: end,
            rooms,
        })
    }

    /// Load the full availability snapshot. Reads run concurrently and every
    /// failure degrades to the permissive default with a logged warning.
    pub async fn load_context(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> AvailabilityContext {
        let assistant_id = self.resolve_assistant_id(professional_id, auth_token).await;
        let professional_scope = professional_id.to_string();

        let (
            clinic_hours,
            professional_hours,
            clinic_breaks,
            professional_breaks,
            clinic_vacations,
            professional_vacations,
            appointments,
        ) = tokio::join!(
            self.load_clinic_hours(assistant_id.as_deref(), auth_token),
            self.load_professional_hours(professional_id, auth_token),
            self.load_breaks("clinic_breaks", "clinic_id", assistant_id.as_deref(), auth_token),
            self.load_breaks(
                "professional_breaks",
                "professional_id",
                Some(professional_scope.as_str()),
                auth_token,
            ),
            self.load_vacations("clinic_id", assistant_id.as_deref(), auth_token),
            self.load_vacations("professional_id", Some(professional_scope.as_str()), auth_token),
            self.load_appointments_for_date(professional_id, date, auth_token),
        );

        AvailabilityContext {
            clinic_hours,
            professional_hours,
            clinic_breaks,
            professional_breaks,
            clinic_vacations,
            professional_vacations,
            appointments,
        }
    }

    // ==========================================================================
    // PRIVATE LOADERS
    // ==========================================================================

    async fn resolve_assistant_id(&self, professional_id: Uuid, auth_token: &str) -> Option<String> {
        let path = format!(
            "/rest/v1/professionals?id=eq.{}&select=assistant_id",
            professional_id
        );
        match self.supabase.request::<Vec<Value>>(Method::GET, &path, Some(auth_token), None).await {
            Ok(rows) => rows
                .first()
                .and_then(|row| row["assistant_id"].as_str().map(str::to_string)),
            Err(e) => {
                warn!("Failed to resolve clinic for professional {}: {}", professional_id, e);
                None
            }
        }
    }

    async fn load_clinic_hours(
        &self,
        assistant_id: Option<&str>,
        auth_token: &str,
    ) -> Option<WeeklyHours> {
        let assistant_id = assistant_id?;
        let path = format!("/rest/v1/clinic_settings?assistant_id=eq.{}", assistant_id);
        match self.supabase.request::<Vec<Value>>(Method::GET, &path, Some(auth_token), None).await {
            Ok(rows) => rows.first().map(WeeklyHours::from_settings_row),
            Err(e) => {
                warn!("Failed to load clinic hours: {}", e);
                None
            }
        }
    }

    async fn load_professional_hours(
        &self,
        professional_id: Uuid,
        auth_token: &str,
    ) -> Option<WeeklyHours> {
        let path = format!(
            "/rest/v1/professional_working_hours?professional_id=eq.{}",
            professional_id
        );
        match self.supabase.request::<Vec<Value>>(Method::GET, &path, Some(auth_token), None).await {
            Ok(rows) => rows.first().map(WeeklyHours::from_settings_row),
            Err(e) => {
                warn!("Failed to load working hours for professional {}: {}", professional_id, e);
                None
            }
        }
    }

    async fn load_breaks(
        &self,
        table: &str,
        scope_column: &str,
        scope_id: Option<&str>,
        auth_token: &str,
    ) -> Vec<BreakWindow> {
        let Some(scope_id) = scope_id else {
            return vec![];
        };
        let path = format!("/rest/v1/{}?{}=eq.{}", table, scope_column, scope_id);
        match self.supabase.request::<Vec<Value>>(Method::GET, &path, Some(auth_token), None).await {
            Ok(rows) => rows.iter().filter_map(parse_break_row).collect(),
            Err(e) => {
                warn!("Failed to load {}: {}", table, e);
                vec![]
            }
        }
    }

    async fn load_vacations(
        &self,
        scope_column: &str,
        scope_id: Option<&str>,
        auth_token: &str,
    ) -> Vec<VacationSpan> {
        let Some(scope_id) = scope_id else {
            return vec![];
        };
        let path = format!("/rest/v1/vacations?{}=eq.{}", scope_column, scope_id);
        match self.supabase.request::<Vec<Value>>(Method::GET, &path, Some(auth_token), None).await {
            Ok(rows) => rows.iter().filter_map(parse_vacation_row).collect(),
            Err(e) => {
                warn!("Failed to load vacations: {}", e);
                vec![]
            }
        }
    }

    async fn load_appointments_for_date(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Vec<BookedInterval> {
        let start_of_day = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end_of_day = date.and_hms_opt(23, 59, 59).unwrap().and_utc();

        // Cancelled appointments never block; scheduled and completed do.
        let path = format!(
            "/rest/v1/appointments?professional_id=eq.{}&start_time=gte.{}&start_time=lte.{}&status=in.(scheduled,completed)&order=start_time.asc",
            professional_id,
            start_of_day.to_rfc3339(),
            end_of_day.to_rfc3339()
        );

        match self.supabase.request::<Vec<Value>>(Method::GET, &path, Some(auth_token), None).await {
            Ok(rows) => rows
                .into_iter()
                .filter_map(|row| serde_json::from_value(row).ok())
                .collect(),
            Err(e) => {
                warn!("Failed to load appointments for {}: {}", date, e);
                vec![]
            }
        }
    }

    async fn load_rooms(&self, assistant_id: Option<&str>, auth_token: &str) -> Vec<Room> {
        let path = match assistant_id {
            Some(id) => format!("/rest/v1/rooms?assistant_id=eq.{}&order=name.asc", id),
            None => "/rest/v1/rooms?order=name.asc".to_string(),
        };
        match self.supabase.request::<Vec<Value>>(Method::GET, &path, Some(auth_token), None).await {
            Ok(rows) => rows
                .into_iter()
                .filter_map(|row| serde_json::from_value(row).ok())
                .collect(),
            Err(e) => {
                warn!("Failed to load rooms: {}", e);
                vec![]
            }
        }
    }

    async fn load_room_bookings(&self, date: NaiveDate, auth_token: &str) -> Vec<BookedInterval> {
        let start_of_day = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end_of_day = date.and_hms_opt(23, 59, 59).unwrap().and_utc();

        let path = format!(
            "/rest/v1/appointments?room_id=not.is.null&start_time=gte.{}&start_time=lte.{}&status=in.(scheduled,completed)&order=start_time.asc",
            start_of_day.to_rfc3339(),
            end_of_day.to_rfc3339()
        );

        match self.supabase.request::<Vec<Value>>(Method::GET, &path, Some(auth_token), None).await {
            Ok(rows) => rows
                .into_iter()
                .filter_map(|row| serde_json::from_value(row).ok())
                .collect(),
            Err(e) => {
                warn!("Failed to load room bookings for {}: {}", date, e);
                vec![]
            }
        }
    }
}

/// The pure tail of the computation, split out so tests can drive it with a
/// hand-built context, a fixed clock, and no network.
pub fn compute_day_availability(
    ctx: &AvailabilityContext,
    professional_id: Uuid,
    date: NaiveDate,
    duration_minutes: i64,
    now: DateTime<Utc>,
) -> Result<DayAvailability, EngineError> {
    if engine::is_date_excluded(date, &ctx.clinic_vacations, &ctx.professional_vacations) {
        return Ok(DayAvailability::closed(date));
    }

    let weekday = date.weekday();
    let clinic_day = ctx.clinic_hours.as_ref().map(|h| *h.for_weekday(weekday));
    let professional_day = ctx.professional_hours.as_ref().map(|h| *h.for_weekday(weekday));

    let Some(window) = engine::effective_window(clinic_day.as_ref(), professional_day.as_ref())
    else {
        return Ok(DayAvailability::closed(date));
    };

    let mut breaks = ctx.clinic_breaks.clone();
    breaks.extend(ctx.professional_breaks.iter().cloned());

    let booked: Vec<BookedInterval> = ctx
        .appointments
        .iter()
        .filter(|a| a.professional_id == professional_id)
        .cloned()
        .collect();

    let not_before = if date == now.date_naive() {
        Some(now.time())
    } else {
        None
    };

    let slots = engine::generate_slots(&SlotRequest {
        date,
        window,
        duration_minutes,
        granularity_minutes: SLOT_GRANULARITY_MINUTES,
        not_before,
        breaks: &breaks,
        booked: &booked,
    })?;

    Ok(DayAvailability {
        date,
        is_closed: false,
        window: Some(window),
        slots: slots.into_iter().map(crate::engine::slots::format_slot).collect(),
    })
}

fn parse_break_row(row: &Value) -> Option<BreakWindow> {
    Some(BreakWindow {
        day_of_week: row["day_of_week"].as_str()?.to_string(),
        start_time: parse_clock_time(row["start_time"].as_str()?)?,
        end_time: parse_clock_time(row["end_time"].as_str()?)?,
    })
}

fn parse_vacation_row(row: &Value) -> Option<VacationSpan> {
    // Timestamps are tolerated; only the date part matters for exclusion.
    let date_of = |field: &str| -> Option<NaiveDate> {
        let raw = row[field].as_str()?;
        raw.get(..10)?.parse().ok()
    };
    Some(VacationSpan {
        start_date: date_of("start_date")?,
        end_date: date_of("end_date")?,
    })
}
