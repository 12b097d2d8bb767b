// libs/directory-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// DIRECTORY ENTITIES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub session_fee: Option<f64>,
    pub professional_share_percentage: Option<f64>,
    pub clinic_share_percentage: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClientRequest {
    pub professional_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub session_fee: Option<f64>,
    pub professional_share_percentage: Option<f64>,
    pub clinic_share_percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClientRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub session_fee: Option<f64>,
    pub professional_share_percentage: Option<f64>,
    pub clinic_share_percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
    pub id: Uuid,
    pub assistant_id: Option<String>,
    pub full_name: String,
    pub email: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfessionalRequest {
    pub assistant_id: Option<String>,
    pub full_name: String,
    pub email: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfessionalRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub assistant_id: Option<String>,
    pub name: String,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoomRequest {
    pub name: Option<String>,
    pub capacity: Option<i32>,
}

// ==============================================================================
// SCHEDULE CONFIGURATION
// ==============================================================================

/// Which scope a working-hours/break/vacation record belongs to. Clinic-level
/// records hang off the assistant account, professional-level records off the
/// professional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleScope {
    Clinic,
    Professional,
}

impl ScheduleScope {
    pub fn hours_table(&self) -> &'static str {
        match self {
            ScheduleScope::Clinic => "clinic_settings",
            ScheduleScope::Professional => "professional_working_hours",
        }
    }

    pub fn breaks_table(&self) -> &'static str {
        match self {
            ScheduleScope::Clinic => "clinic_breaks",
            ScheduleScope::Professional => "professional_breaks",
        }
    }

    pub fn scope_column(&self) -> &'static str {
        match self {
            ScheduleScope::Clinic => "clinic_id",
            ScheduleScope::Professional => "professional_id",
        }
    }

    /// The hours tables key the clinic scope by `assistant_id` while the
    /// break/vacation tables use `clinic_id`.
    pub fn hours_scope_column(&self) -> &'static str {
        match self {
            ScheduleScope::Clinic => "assistant_id",
            ScheduleScope::Professional => "professional_id",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakRecord {
    pub id: Uuid,
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBreakRequest {
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacationRecord {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVacationRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub title: Option<String>,
    pub description: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
