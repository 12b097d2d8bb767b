use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            meet_base_url: "https://meet.jit.si".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "professional".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn professional(email: &str) -> Self {
        Self::new(email, "professional")
    }

    pub fn assistant(email: &str) -> Self {
        Self::new(email, "assistant")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }
}

/// Canned PostgREST response bodies for wiremock-backed tests.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn client_response(id: &str, professional_id: &str, full_name: &str) -> Value {
        json!({
            "id": id,
            "professional_id": professional_id,
            "full_name": full_name,
            "email": "client@example.com",
            "phone": null,
            "session_fee": 200.0,
            "professional_share_percentage": 60.0,
            "clinic_share_percentage": 40.0
        })
    }

    pub fn professional_response(id: &str, assistant_id: &str, full_name: &str) -> Value {
        json!({
            "id": id,
            "assistant_id": assistant_id,
            "full_name": full_name,
            "email": "professional@example.com",
            "title": "Psychologist"
        })
    }

    pub fn room_response(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "capacity": 2
        })
    }

    pub fn appointment_response(
        id: &str,
        client_id: &str,
        professional_id: &str,
        start_time: &str,
        end_time: &str,
    ) -> Value {
        json!({
            "id": id,
            "client_id": client_id,
            "professional_id": professional_id,
            "room_id": null,
            "start_time": start_time,
            "end_time": end_time,
            "status": "scheduled",
            "is_online": false,
            "meeting_url": null,
            "notes": null,
            "created_at": "2026-01-05T09:00:00Z"
        })
    }

    /// A clinic_settings row with every day open 09:00-18:00 except the weekend.
    pub fn clinic_settings_response(assistant_id: &str) -> Value {
        let mut row = json!({
            "id": Uuid::new_v4().to_string(),
            "assistant_id": assistant_id
        });
        let days = ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];
        for day in days {
            let open = day != "saturday" && day != "sunday";
            row[format!("opening_time_{}", day)] = json!("09:00");
            row[format!("closing_time_{}", day)] = json!("18:00");
            row[format!("is_open_{}", day)] = json!(open);
        }
        row
    }

    pub fn working_hours_response(professional_id: &str, opening: &str, closing: &str) -> Value {
        let mut row = json!({
            "id": Uuid::new_v4().to_string(),
            "professional_id": professional_id
        });
        let days = ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];
        for day in days {
            row[format!("opening_time_{}", day)] = json!(opening);
            row[format!("closing_time_{}", day)] = json!(closing);
            row[format!("is_open_{}", day)] = json!(true);
        }
        row
    }
}
