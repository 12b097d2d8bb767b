// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

// ==============================================================================
// WORKING HOURS
// ==============================================================================

/// Opening window of a single weekday, for one scope (clinic or professional).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayHours {
    pub opening: NaiveTime,
    pub closing: NaiveTime,
    pub is_open: bool,
}

impl DayHours {
    /// Fully open day. Missing or malformed configuration degrades to this so
    /// that a configuration gap never blocks booking.
    pub fn permissive() -> Self {
        Self {
            opening: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            closing: NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
            is_open: true,
        }
    }

    pub fn closed() -> Self {
        Self {
            opening: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            closing: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            is_open: false,
        }
    }

    pub fn open(opening: NaiveTime, closing: NaiveTime) -> Self {
        Self { opening, closing, is_open: true }
    }
}

/// One week of opening windows, keyed by weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl WeeklyHours {
    pub fn for_weekday(&self, weekday: Weekday) -> &DayHours {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    /// The week a fresh clinic gets before anyone touches settings:
    /// weekdays 09:00-18:00, weekend closed.
    pub fn default_week() -> Self {
        let weekday = DayHours::open(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        );
        let weekend = DayHours {
            is_open: false,
            ..weekday
        };
        Self {
            monday: weekday,
            tuesday: weekday,
            wednesday: weekday,
            thursday: weekday,
            friday: weekday,
            saturday: weekend,
            sunday: weekend,
        }
    }

    /// Parse a `clinic_settings` / `professional_working_hours` row. The row
    /// stores one `opening_time_<day>` / `closing_time_<day>` / `is_open_<day>`
    /// triple per weekday; null fields fall back to the default week and an
    /// unparseable time degrades the whole day to the permissive window.
    pub fn from_settings_row(row: &Value) -> Self {
        let defaults = Self::default_week();
        Self {
            monday: parse_day(row, "monday", &defaults.monday),
            tuesday: parse_day(row, "tuesday", &defaults.tuesday),
            wednesday: parse_day(row, "wednesday", &defaults.wednesday),
            thursday: parse_day(row, "thursday", &defaults.thursday),
            friday: parse_day(row, "friday", &defaults.friday),
            saturday: parse_day(row, "saturday", &defaults.saturday),
            sunday: parse_day(row, "sunday", &defaults.sunday),
        }
    }
}

fn parse_day(row: &Value, day: &str, default: &DayHours) -> DayHours {
    let is_open = row[format!("is_open_{}", day)]
        .as_bool()
        .unwrap_or(default.is_open);

    let opening = match parse_time_field(row, &format!("opening_time_{}", day)) {
        Ok(Some(t)) => t,
        Ok(None) => default.opening,
        Err(()) => {
            warn!("Malformed opening time for {}, falling back to permissive window", day);
            return DayHours { is_open, ..DayHours::permissive() };
        }
    };
    let closing = match parse_time_field(row, &format!("closing_time_{}", day)) {
        Ok(Some(t)) => t,
        Ok(None) => default.closing,
        Err(()) => {
            warn!("Malformed closing time for {}, falling back to permissive window", day);
            return DayHours { is_open, ..DayHours::permissive() };
        }
    };

    DayHours { opening, closing, is_open }
}

/// Ok(None) = field absent/null, Err = present but unparseable.
fn parse_time_field(row: &Value, field: &str) -> Result<Option<NaiveTime>, ()> {
    match row[field].as_str() {
        None => Ok(None),
        Some(raw) => parse_clock_time(raw).map(Some).ok_or(()),
    }
}

/// Accepts both "HH:MM" and "HH:MM:SS".
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Effective opening window of a day: clinic hours intersected with
/// professional hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub opening: NaiveTime,
    pub closing: NaiveTime,
}

// ==============================================================================
// EXCLUSIONS
// ==============================================================================

/// Closed date range during which a scope takes no appointments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacationSpan {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Recurring within-day exclusion window (lunch break and the like).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakWindow {
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl BreakWindow {
    pub fn applies_on(&self, weekday: Weekday) -> bool {
        self.day_of_week.eq_ignore_ascii_case(weekday_name(weekday))
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

// ==============================================================================
// BOOKINGS
// ==============================================================================

/// The slice of an appointment row the engine needs for conflict checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedInterval {
    pub professional_id: Uuid,
    #[serde(default)]
    pub room_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub capacity: Option<i32>,
}

// ==============================================================================
// ENGINE INPUT/OUTPUT
// ==============================================================================

/// Everything the slot generator needs, threaded in explicitly so the
/// computation stays a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct SlotRequest<'a> {
    pub date: NaiveDate,
    pub window: TimeWindow,
    pub duration_minutes: i64,
    pub granularity_minutes: i64,
    /// For today's date the caller passes the current clock time so slots in
    /// the past are not offered. `None` for any other day.
    pub not_before: Option<NaiveTime>,
    pub breaks: &'a [BreakWindow],
    pub booked: &'a [BookedInterval],
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("Session duration and slot granularity must be positive")]
    InvalidDuration,
}

// ==============================================================================
// HTTP MODELS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct DayAvailabilityQuery {
    pub date: NaiveDate,
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RoomAvailabilityQuery {
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub is_closed: bool,
    pub window: Option<TimeWindow>,
    /// Bookable start times, ascending, "HH:MM".
    pub slots: Vec<String>,
}

impl DayAvailability {
    pub fn closed(date: NaiveDate) -> Self {
        Self { date, is_closed: true, window: None, slots: vec![] }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAvailability {
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub rooms: Vec<Room>,
}
