use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

async fn create_test_app(config: AppConfig) -> Router {
    appointment_routes(Arc::new(config))
}

fn auth_header(config: &TestConfig) -> String {
    let user = TestUser::assistant("assistant@example.com");
    format!("Bearer {}", JwtTestUtils::create_test_token(&user, &config.jwt_secret, None))
}

fn appointment_row(
    id: Uuid,
    client_id: Uuid,
    professional_id: Uuid,
    status: &str,
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
        "status": status,
        "is_online": true,
        "meeting_url": "https://meet.jit.si/abc123",
        "notes": null,
        "created_at": "2027-08-01T09:00:00Z"
    })
}

/// Mocks for the availability re-check the booking path performs before
/// every insert.
async fn setup_availability_mocks(mock_server: &MockServer, professional_id: Uuid, assistant_id: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/professionals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "assistant_id": assistant_id }
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/clinic_settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::clinic_settings_response(assistant_id)
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/professional_working_hours"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::working_hours_response(&professional_id.to_string(), "09:00", "18:00")
        ])))
        .mount(mock_server)
        .await;

    for table in ["clinic_breaks", "professional_breaks", "vacations"] {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{}", table)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(mock_server)
            .await;
    }
}

// ==============================================================================
// BOOKING
// ==============================================================================

#[tokio::test]
async fn create_online_appointment_succeeds() {
    let mock_server = MockServer::start().await;
    let client_id = Uuid::new_v4();
    let professional_id = Uuid::new_v4();
    let assistant_id = Uuid::new_v4().to_string();

    setup_availability_mocks(&mock_server, professional_id, &assistant_id).await;

    // No existing appointments on the day.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            appointment_row(
                Uuid::new_v4(),
                client_id,
                professional_id,
                "scheduled",
                "2027-08-10T10:00:00Z",
                "2027-08-10T10:45:00Z",
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let app = create_test_app(config.to_app_config()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", auth_header(&config))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "client_id": client_id,
                "professional_id": professional_id,
                "date": "2027-08-10",
                "time": "10:00",
                "duration_minutes": 45,
                "is_online": true
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let result: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(result["success"], json!(true));
    assert_eq!(result["appointments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn conflicting_slot_is_rejected_at_confirmation_time() {
    let mock_server = MockServer::start().await;
    let client_id = Uuid::new_v4();
    let professional_id = Uuid::new_v4();
    let assistant_id = Uuid::new_v4().to_string();

    setup_availability_mocks(&mock_server, professional_id, &assistant_id).await;

    // The professional already has 10:00-10:45 booked.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "professional_id": professional_id,
                "room_id": null,
                "start_time": "2027-08-10T10:00:00Z",
                "end_time": "2027-08-10T10:45:00Z"
            }
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let app = create_test_app(config.to_app_config()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", auth_header(&config))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "client_id": client_id,
                "professional_id": professional_id,
                "date": "2027-08-10",
                "time": "10:00",
                "is_online": true
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn missing_required_field_is_a_validation_error() {
    let config = TestConfig::default();
    let app = create_test_app(config.to_app_config()).await;

    // No client_id: rejected before any backend call.
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", auth_header(&config))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "professional_id": Uuid::new_v4(),
                "date": "2027-08-10",
                "time": "10:00",
                "is_online": true
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let result: Value = serde_json::from_slice(&body).unwrap();
    assert!(result["error"].as_str().unwrap().contains("client_id"));
}

// ==============================================================================
// LIFECYCLE AND PAYMENTS
// ==============================================================================

#[tokio::test]
async fn completing_an_appointment_creates_a_payment_record() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();
    let client_id = Uuid::new_v4();
    let professional_id = Uuid::new_v4();

    // Fee lookup with the embedded client share configuration.
    let mut completed_row = appointment_row(
        appointment_id,
        client_id,
        professional_id,
        "completed",
        "2027-08-10T10:00:00Z",
        "2027-08-10T10:45:00Z",
    );
    completed_row["client"] = json!({
        "session_fee": 200.0,
        "professional_share_percentage": 60.0,
        "clinic_share_percentage": 40.0
    });

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param(
            "select",
            "*,client:clients(session_fee,professional_share_percentage,clinic_share_percentage)",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([completed_row])))
        .mount(&mock_server)
        .await;

    // Current-state lookup.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(
                appointment_id,
                client_id,
                professional_id,
                "scheduled",
                "2027-08-10T10:00:00Z",
                "2027-08-10T10:45:00Z",
            )
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(
                appointment_id,
                client_id,
                professional_id,
                "completed",
                "2027-08-10T10:00:00Z",
                "2027-08-10T10:45:00Z",
            )
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/payments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let app = create_test_app(config.to_app_config()).await;

    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/{}/status", appointment_id))
        .header("Authorization", auth_header(&config))
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "status": "completed" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let result: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(result["appointment"]["status"], "completed");
}

#[tokio::test]
async fn reverting_completed_requires_confirmation() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(
                appointment_id,
                Uuid::new_v4(),
                Uuid::new_v4(),
                "completed",
                "2027-08-10T10:00:00Z",
                "2027-08-10T10:45:00Z",
            )
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let app = create_test_app(config.to_app_config()).await;

    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/{}/status", appointment_id))
        .header("Authorization", auth_header(&config))
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "status": "scheduled" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reverting_completed_deletes_the_payment_record() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();
    let client_id = Uuid::new_v4();
    let professional_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(
                appointment_id,
                client_id,
                professional_id,
                "completed",
                "2027-08-10T10:00:00Z",
                "2027-08-10T10:45:00Z",
            )
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/payments"))
        .and(query_param("appointment_id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(
                appointment_id,
                client_id,
                professional_id,
                "scheduled",
                "2027-08-10T10:00:00Z",
                "2027-08-10T10:45:00Z",
            )
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let app = create_test_app(config.to_app_config()).await;

    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/{}/status", appointment_id))
        .header("Authorization", auth_header(&config))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({ "status": "scheduled", "confirm_payment_removal": true }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let result: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(result["appointment"]["status"], "scheduled");
}

// ==============================================================================
// SHARING
// ==============================================================================

#[tokio::test]
async fn share_payload_contains_message_and_room_name() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    let mut row = appointment_row(
        appointment_id,
        Uuid::new_v4(),
        Uuid::new_v4(),
        "scheduled",
        "2027-08-10T10:00:00Z",
        "2027-08-10T10:45:00Z",
    );
    row["client"] = json!({ "full_name": "Jane Doe" });
    row["professional"] = json!({ "full_name": "Dr. Smith" });

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let app = create_test_app(config.to_app_config()).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/{}/share", appointment_id))
        .header("Authorization", auth_header(&config))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let share: Value = serde_json::from_slice(&body).unwrap();

    let message = share["message"].as_str().unwrap();
    assert!(message.contains("Jane Doe"));
    assert!(message.contains("Dr. Smith"));
    assert!(message.contains("https://meet.jit.si/abc123"));
    assert_eq!(share["meeting_room"], "abc123");
}

#[tokio::test]
async fn appointment_routes_require_authentication() {
    let config = TestConfig::default();
    let app = create_test_app(config.to_app_config()).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/{}", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
