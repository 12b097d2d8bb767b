// libs/directory-cell/src/services/schedule.rs
//
// Working hours, breaks and vacations, per scope (clinic or professional).
// These tables feed the availability engine; this service is only their
// configuration surface.

use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use scheduling_cell::models::{DayHours, WeeklyHours};

use crate::models::{
    BreakRecord, CreateBreakRequest, CreateVacationRequest, DirectoryError, ScheduleScope,
    VacationRecord,
};

pub struct ScheduleService {
    supabase: SupabaseClient,
}

impl ScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    // ==========================================================================
    // WORKING HOURS
    // ==========================================================================

    /// Read the weekly hours for a scope. An unconfigured scope reports the
    /// default week rather than an error, mirroring what the availability
    /// computation assumes.
    pub async fn get_working_hours(
        &self,
        scope: ScheduleScope,
        scope_id: &str,
        auth_token: &str,
    ) -> Result<WeeklyHours, DirectoryError> {
        let path = format!(
            "/rest/v1/{}?{}=eq.{}",
            scope.hours_table(),
            scope.hours_scope_column(),
            scope_id
        );

        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;

        Ok(result
            .first()
            .map(WeeklyHours::from_settings_row)
            .unwrap_or_else(WeeklyHours::default_week))
    }

    pub async fn put_working_hours(
        &self,
        scope: ScheduleScope,
        scope_id: &str,
        hours: WeeklyHours,
        auth_token: &str,
    ) -> Result<WeeklyHours, DirectoryError> {
        debug!("Updating {} working hours for {}", scope.hours_table(), scope_id);

        validate_weekly_hours(&hours)?;

        let row = weekly_hours_to_row(&hours);

        let lookup = format!(
            "/rest/v1/{}?{}=eq.{}&select=id",
            scope.hours_table(),
            scope.hours_scope_column(),
            scope_id
        );
        let existing: Vec<Value> = self.supabase
            .request(Method::GET, &lookup, Some(auth_token), None)
            .await
            .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = if existing.is_empty() {
            let mut insert_row = row;
            insert_row.insert(scope.hours_scope_column().to_string(), json!(scope_id));
            self.supabase.request_with_headers(
                Method::POST,
                &format!("/rest/v1/{}", scope.hours_table()),
                Some(auth_token),
                Some(Value::Object(insert_row)),
                Some(headers),
            ).await
        } else {
            let path = format!(
                "/rest/v1/{}?{}=eq.{}",
                scope.hours_table(),
                scope.hours_scope_column(),
                scope_id
            );
            self.supabase.request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(row)),
                Some(headers),
            ).await
        }
        .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;

        let row = result.first()
            .ok_or_else(|| DirectoryError::DatabaseError("Write returned no rows".to_string()))?;

        Ok(WeeklyHours::from_settings_row(row))
    }

    // ==========================================================================
    // BREAKS
    // ==========================================================================

    pub async fn list_breaks(
        &self,
        scope: ScheduleScope,
        scope_id: &str,
        auth_token: &str,
    ) -> Result<Vec<BreakRecord>, DirectoryError> {
        let path = format!(
            "/rest/v1/{}?{}=eq.{}&order=day_of_week.asc,start_time.asc",
            scope.breaks_table(),
            scope.scope_column(),
            scope_id
        );

        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<BreakRecord>, _>>()
            .map_err(|e| DirectoryError::DatabaseError(format!("Failed to parse breaks: {}", e)))
    }

    pub async fn create_break(
        &self,
        scope: ScheduleScope,
        scope_id: &str,
        request: CreateBreakRequest,
        auth_token: &str,
    ) -> Result<BreakRecord, DirectoryError> {
        if request.start_time >= request.end_time {
            return Err(DirectoryError::ValidationError(
                "Break start time must be before end time".to_string(),
            ));
        }

        let mut data = Map::new();
        data.insert(scope.scope_column().to_string(), json!(scope_id));
        data.insert("day_of_week".to_string(), json!(request.day_of_week.to_lowercase()));
        data.insert("start_time".to_string(), json!(request.start_time));
        data.insert("end_time".to_string(), json!(request.end_time));
        data.insert("description".to_string(), json!(request.description));

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            &format!("/rest/v1/{}", scope.breaks_table()),
            Some(auth_token),
            Some(Value::Object(data)),
            Some(headers),
        ).await.map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next()
            .ok_or_else(|| DirectoryError::DatabaseError("Insert returned no rows".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| DirectoryError::DatabaseError(format!("Failed to parse break: {}", e)))
    }

    pub async fn delete_break(
        &self,
        scope: ScheduleScope,
        break_id: Uuid,
        auth_token: &str,
    ) -> Result<(), DirectoryError> {
        let path = format!("/rest/v1/{}?id=eq.{}", scope.breaks_table(), break_id);
        let _: Vec<Value> = self.supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    // ==========================================================================
    // VACATIONS
    // ==========================================================================

    pub async fn list_vacations(
        &self,
        scope: ScheduleScope,
        scope_id: &str,
        auth_token: &str,
    ) -> Result<Vec<VacationRecord>, DirectoryError> {
        let path = format!(
            "/rest/v1/vacations?{}=eq.{}&order=start_date.asc",
            scope.scope_column(),
            scope_id
        );

        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<VacationRecord>, _>>()
            .map_err(|e| DirectoryError::DatabaseError(format!("Failed to parse vacations: {}", e)))
    }

    pub async fn create_vacation(
        &self,
        scope: ScheduleScope,
        scope_id: &str,
        request: CreateVacationRequest,
        auth_token: &str,
    ) -> Result<VacationRecord, DirectoryError> {
        if request.start_date > request.end_date {
            return Err(DirectoryError::ValidationError(
                "Vacation start date must not be after end date".to_string(),
            ));
        }

        let mut data = Map::new();
        data.insert(scope.scope_column().to_string(), json!(scope_id));
        data.insert("start_date".to_string(), json!(request.start_date));
        data.insert("end_date".to_string(), json!(request.end_date));
        data.insert("title".to_string(), json!(request.title));
        data.insert("description".to_string(), json!(request.description));

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/vacations",
            Some(auth_token),
            Some(Value::Object(data)),
            Some(headers),
        ).await.map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next()
            .ok_or_else(|| DirectoryError::DatabaseError("Insert returned no rows".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| DirectoryError::DatabaseError(format!("Failed to parse vacation: {}", e)))
    }

    pub async fn delete_vacation(
        &self,
        vacation_id: Uuid,
        auth_token: &str,
    ) -> Result<(), DirectoryError> {
        let path = format!("/rest/v1/vacations?id=eq.{}", vacation_id);
        let _: Vec<Value> = self.supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

fn validate_weekly_hours(hours: &WeeklyHours) -> Result<(), DirectoryError> {
    let days = [
        ("monday", &hours.monday),
        ("tuesday", &hours.tuesday),
        ("wednesday", &hours.wednesday),
        ("thursday", &hours.thursday),
        ("friday", &hours.friday),
        ("saturday", &hours.saturday),
        ("sunday", &hours.sunday),
    ];

    for (name, day) in days {
        if day.is_open && day.opening > day.closing {
            return Err(DirectoryError::ValidationError(format!(
                "Opening time must not be after closing time on {}",
                name
            )));
        }
    }

    Ok(())
}

fn weekly_hours_to_row(hours: &WeeklyHours) -> Map<String, Value> {
    let mut row = Map::new();
    let days: [(&str, &DayHours); 7] = [
        ("monday", &hours.monday),
        ("tuesday", &hours.tuesday),
        ("wednesday", &hours.wednesday),
        ("thursday", &hours.thursday),
        ("friday", &hours.friday),
        ("saturday", &hours.saturday),
        ("sunday", &hours.sunday),
    ];

    for (name, day) in days {
        row.insert(
            format!("opening_time_{}", name),
            json!(day.opening.format("%H:%M").to_string()),
        );
        row.insert(
            format!("closing_time_{}", name),
            json!(day.closing.format("%H:%M").to_string()),
        );
        row.insert(format!("is_open_{}", name), json!(day.is_open));
    }

    row
}
