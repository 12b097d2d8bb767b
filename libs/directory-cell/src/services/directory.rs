// libs/directory-cell/src/services/directory.rs
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use scheduling_cell::models::Room;

use crate::models::{
    Client, CreateClientRequest, CreateProfessionalRequest, CreateRoomRequest, DirectoryError,
    Professional, UpdateClientRequest, UpdateProfessionalRequest, UpdateRoomRequest,
};

pub struct DirectoryService {
    supabase: SupabaseClient,
}

impl DirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    // ==========================================================================
    // CLIENTS
    // ==========================================================================

    pub async fn list_clients(
        &self,
        professional_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<Vec<Client>, DirectoryError> {
        let path = match professional_id {
            Some(id) => format!("/rest/v1/clients?professional_id=eq.{}&order=full_name.asc", id),
            None => "/rest/v1/clients?order=full_name.asc".to_string(),
        };
        self.fetch_list(&path, auth_token).await
    }

    pub async fn create_client(
        &self,
        request: CreateClientRequest,
        auth_token: &str,
    ) -> Result<Client, DirectoryError> {
        debug!("Creating client: {}", request.full_name);

        if request.full_name.trim().is_empty() {
            return Err(DirectoryError::ValidationError("Client name is required".to_string()));
        }

        let data = json!({
            "professional_id": request.professional_id,
            "full_name": request.full_name,
            "email": request.email,
            "phone": request.phone,
            "session_fee": request.session_fee,
            "professional_share_percentage": request.professional_share_percentage,
            "clinic_share_percentage": request.clinic_share_percentage
        });

        self.insert("/rest/v1/clients", data, auth_token).await
    }

    pub async fn update_client(
        &self,
        client_id: Uuid,
        request: UpdateClientRequest,
        auth_token: &str,
    ) -> Result<Client, DirectoryError> {
        let mut update_data = serde_json::Map::new();

        if let Some(full_name) = request.full_name {
            update_data.insert("full_name".to_string(), json!(full_name));
        }
        if let Some(email) = request.email {
            update_data.insert("email".to_string(), json!(email));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(fee) = request.session_fee {
            update_data.insert("session_fee".to_string(), json!(fee));
        }
        if let Some(share) = request.professional_share_percentage {
            update_data.insert("professional_share_percentage".to_string(), json!(share));
        }
        if let Some(share) = request.clinic_share_percentage {
            update_data.insert("clinic_share_percentage".to_string(), json!(share));
        }

        let path = format!("/rest/v1/clients?id=eq.{}", client_id);
        self.patch(&path, Value::Object(update_data), auth_token).await
    }

    pub async fn delete_client(&self, client_id: Uuid, auth_token: &str) -> Result<(), DirectoryError> {
        let path = format!("/rest/v1/clients?id=eq.{}", client_id);
        self.delete(&path, auth_token).await
    }

    // ==========================================================================
    // PROFESSIONALS
    // ==========================================================================

    pub async fn list_professionals(
        &self,
        assistant_id: Option<&str>,
        auth_token: &str,
    ) -> Result<Vec<Professional>, DirectoryError> {
        let path = match assistant_id {
            Some(id) => format!("/rest/v1/professionals?assistant_id=eq.{}&order=full_name.asc", id),
            None => "/rest/v1/professionals?order=full_name.asc".to_string(),
        };
        self.fetch_list(&path, auth_token).await
    }

    pub async fn get_professional(
        &self,
        professional_id: Uuid,
        auth_token: &str,
    ) -> Result<Professional, DirectoryError> {
        let path = format!("/rest/v1/professionals?id=eq.{}", professional_id);
        let result: Vec<Professional> = self.fetch_list(&path, auth_token).await?;
        result.into_iter().next().ok_or(DirectoryError::NotFound)
    }

    pub async fn create_professional(
        &self,
        request: CreateProfessionalRequest,
        auth_token: &str,
    ) -> Result<Professional, DirectoryError> {
        debug!("Creating professional: {}", request.full_name);

        if request.full_name.trim().is_empty() {
            return Err(DirectoryError::ValidationError("Professional name is required".to_string()));
        }

        let data = json!({
            "assistant_id": request.assistant_id,
            "full_name": request.full_name,
            "email": request.email,
            "title": request.title
        });

        self.insert("/rest/v1/professionals", data, auth_token).await
    }

    pub async fn update_professional(
        &self,
        professional_id: Uuid,
        request: UpdateProfessionalRequest,
        auth_token: &str,
    ) -> Result<Professional, DirectoryError> {
        let mut update_data = serde_json::Map::new();

        if let Some(full_name) = request.full_name {
            update_data.insert("full_name".to_string(), json!(full_name));
        }
        if let Some(email) = request.email {
            update_data.insert("email".to_string(), json!(email));
        }
        if let Some(title) = request.title {
            update_data.insert("title".to_string(), json!(title));
        }

        let path = format!("/rest/v1/professionals?id=eq.{}", professional_id);
        self.patch(&path, Value::Object(update_data), auth_token).await
    }

    pub async fn delete_professional(
        &self,
        professional_id: Uuid,
        auth_token: &str,
    ) -> Result<(), DirectoryError> {
        let path = format!("/rest/v1/professionals?id=eq.{}", professional_id);
        self.delete(&path, auth_token).await
    }

    // ==========================================================================
    // ROOMS
    // ==========================================================================

    pub async fn list_rooms(
        &self,
        assistant_id: Option<&str>,
        auth_token: &str,
    ) -> Result<Vec<Room>, DirectoryError> {
        let path = match assistant_id {
            Some(id) => format!("/rest/v1/rooms?assistant_id=eq.{}&order=name.asc", id),
            None => "/rest/v1/rooms?order=name.asc".to_string(),
        };
        self.fetch_list(&path, auth_token).await
    }

    pub async fn create_room(
        &self,
        request: CreateRoomRequest,
        auth_token: &str,
    ) -> Result<Room, DirectoryError> {
        if request.name.trim().is_empty() {
            return Err(DirectoryError::ValidationError("Room name is required".to_string()));
        }

        let data = json!({
            "assistant_id": request.assistant_id,
            "name": request.name,
            "capacity": request.capacity
        });

        self.insert("/rest/v1/rooms", data, auth_token).await
    }

    pub async fn update_room(
        &self,
        room_id: Uuid,
        request: UpdateRoomRequest,
        auth_token: &str,
    ) -> Result<Room, DirectoryError> {
        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(capacity) = request.capacity {
            update_data.insert("capacity".to_string(), json!(capacity));
        }

        let path = format!("/rest/v1/rooms?id=eq.{}", room_id);
        self.patch(&path, Value::Object(update_data), auth_token).await
    }

    pub async fn delete_room(&self, room_id: Uuid, auth_token: &str) -> Result<(), DirectoryError> {
        let path = format!("/rest/v1/rooms?id=eq.{}", room_id);
        self.delete(&path, auth_token).await
    }

    // ==========================================================================
    // PRIVATE HELPER METHODS
    // ==========================================================================

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        auth_token: &str,
    ) -> Result<T, DirectoryError> {
        self.supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await
            .map_err(|e| DirectoryError::DatabaseError(e.to_string()))
    }

    async fn insert<T: DeserializeOwned>(
        &self,
        path: &str,
        data: Value,
        auth_token: &str,
    ) -> Result<T, DirectoryError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase
            .request_with_headers(Method::POST, path, Some(auth_token), Some(data), Some(headers))
            .await
            .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next()
            .ok_or_else(|| DirectoryError::DatabaseError("Insert returned no rows".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| DirectoryError::DatabaseError(format!("Failed to parse row: {}", e)))
    }

    async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        data: Value,
        auth_token: &str,
    ) -> Result<T, DirectoryError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase
            .request_with_headers(Method::PATCH, path, Some(auth_token), Some(data), Some(headers))
            .await
            .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(DirectoryError::NotFound)?;

        serde_json::from_value(row)
            .map_err(|e| DirectoryError::DatabaseError(format!("Failed to parse row: {}", e)))
    }

    async fn delete(&self, path: &str, auth_token: &str) -> Result<(), DirectoryError> {
        let _: Vec<Value> = self.supabase
            .request(Method::DELETE, path, Some(auth_token), None)
            .await
            .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
