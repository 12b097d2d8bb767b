// libs/appointment-cell/src/services/lifecycle.rs
//
// Status transitions and their write-time side effects. Completing an
// appointment derives a payment record from the client's fee configuration;
// reverting a completed appointment deletes that record again.

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, ClientFeeConfig, Payment,
    UpdateStatusRequest,
};

pub struct AppointmentLifecycleService {
    supabase: SupabaseClient,
}

impl AppointmentLifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        request: UpdateStatusRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment {} status to {}", appointment_id, request.status);

        let current = self.get_appointment(appointment_id, auth_token).await?;

        // Reverting a completed appointment takes its payment record with it.
        if current.status == AppointmentStatus::Completed
            && request.status == AppointmentStatus::Scheduled
        {
            if request.confirm_payment_removal != Some(true) {
                return Err(AppointmentError::ValidationError(
                    "Reverting a completed appointment deletes its payment record; \
                     set confirm_payment_removal to proceed"
                        .to_string(),
                ));
            }
            self.delete_payment(appointment_id, auth_token).await?;
        }

        let updated = self.patch_status(appointment_id, request.status, auth_token).await?;

        if request.status == AppointmentStatus::Completed {
            self.create_payment_for(appointment_id, auth_token).await?;
        }

        Ok(updated)
    }

    // ==========================================================================
    // PRIVATE HELPER METHODS
    // ==========================================================================

    async fn get_appointment(
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

    async fn patch_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(json!({ "status": status.to_string() })),
            Some(headers),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(row)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    /// Derive the payment record for a completed appointment from the
    /// client's fee configuration. A client without fee configuration simply
    /// produces no payment, matching the original behavior.
    async fn create_payment_for(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&select=*,client:clients(session_fee,professional_share_percentage,clinic_share_percentage)",
            appointment_id
        );
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let Some(row) = result.into_iter().next() else {
            return Err(AppointmentError::NotFound);
        };

        let professional_id = row["professional_id"].clone();
        let fee_config: ClientFeeConfig = match serde_json::from_value(row["client"].clone()) {
            Ok(config) => config,
            Err(_) => {
                warn!(
                    "Appointment {} completed without client fee configuration, skipping payment",
                    appointment_id
                );
                return Ok(());
            }
        };

        let (professional_amount, clinic_amount) = fee_config.split();

        let payment_data = json!({
            "appointment_id": appointment_id,
            "professional_id": professional_id,
            "amount": fee_config.session_fee,
            "professional_amount": professional_amount,
            "clinic_amount": clinic_amount,
            "payment_status": "pending",
            "collected_by": "clinic",
            "payment_date": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/payments",
            Some(auth_token),
            Some(payment_data),
            Some(headers),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if let Some(row) = result.into_iter().next() {
            let payment: Payment = serde_json::from_value(row)
                .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse payment: {}", e)))?;
            debug!("Payment {} created for appointment {}", payment.id, appointment_id);
        }

        Ok(())
    }

    async fn delete_payment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        debug!("Deleting payment record for appointment {}", appointment_id);

        let path = format!("/rest/v1/payments?appointment_id=eq.{}", appointment_id);
        let _: Vec<Value> = self.supabase.request(
            Method::DELETE,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
