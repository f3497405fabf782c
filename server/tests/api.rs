//! End-to-end API tests over the full router with in-memory providers.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use axum::Router;
use axum::http::StatusCode;
use axum_test::{TestServer, TestServerConfig};
use chrono::{Duration, Utc};
use gather_server::config::AppConfig;
use gather_server::mocks::{MockEmailProvider, MockStore};
use gather_server::router::api_router;
use gather_server::state::AppState;
use gather_server::stores::MemorySessionStore;
use serde_json::{Value, json};

/// Build the router over fresh in-memory providers.
fn test_router() -> Router {
    test_router_with_mailer().0
}

/// Build the router and keep a handle on the mailer for assertions.
fn test_router_with_mailer() -> (Router, MockEmailProvider) {
    let mailer = MockEmailProvider::new();
    let state = AppState::new(
        MockStore::new(),
        MemorySessionStore::new(),
        mailer.clone(),
        AppConfig::default(),
    );
    (api_router(state), mailer)
}

/// A test client with its own cookie jar.
///
/// The router is `Clone`, so multiple clients over the same router share
/// state while keeping separate sessions.
fn client(app: &Router) -> TestServer {
    TestServer::new_with_config(
        app.clone(),
        TestServerConfig {
            save_cookies: true,
            ..TestServerConfig::default()
        },
    )
    .expect("test server")
}

/// Sign up a user and return the response body. The client's cookie jar
/// now holds that user's session.
async fn signup(server: &TestServer, full_name: &str, email: &str) -> Value {
    let response = server
        .post("/api/signup")
        .json(&json!({
            "full_name": full_name,
            "email_address": email,
            "password": "password123",
            "password_confirmation": "password123",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()
}

/// Create an event as the server's current user and return its body.
async fn create_event(server: &TestServer, name: &str, spots: i64) -> Value {
    let response = server
        .post("/api/events")
        .json(&json!({
            "event_name": name,
            "event_location": "Community Hall",
            "event_description": "Bring a friend",
            "available_spots": spots,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()
}

fn errors_of(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .map(|v| v.as_str().unwrap_or_default().to_string())
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Accounts
// ═══════════════════════════════════════════════════════════

#[tokio::test]
async fn signup_opens_a_session() {
    let app = test_router();
    let server = client(&app);

    let body = signup(&server, "Jane Doe", "jane@example.com").await;
    assert_eq!(body["full_name"], "Jane Doe");
    assert_eq!(body["email_address"], "jane@example.com");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let me = server.get("/api/me").await;
    assert_eq!(me.status_code(), StatusCode::OK);
    assert_eq!(me.json::<Value>()["email_address"], "jane@example.com");
}

#[tokio::test]
async fn signup_lowercases_the_email() {
    let app = test_router();
    let server = client(&app);

    let body = signup(&server, "Jane Doe", "Jane@Example.COM").await;
    assert_eq!(body["email_address"], "jane@example.com");
}

#[tokio::test]
async fn signup_rejects_duplicate_email_case_insensitively() {
    let app = test_router();
    let server = client(&app);
    signup(&server, "Jane Doe", "jane@example.com").await;

    let other = client(&app);
    let response = other
        .post("/api/signup")
        .json(&json!({
            "full_name": "Other Person",
            "email_address": "JANE@EXAMPLE.COM",
            "password": "password123",
            "password_confirmation": "password123",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        errors_of(&response.json()),
        vec!["Email address has already been taken".to_string()]
    );
}

#[tokio::test]
async fn duplicate_email_is_listed_with_other_violations() {
    let app = test_router();
    signup(&client(&app), "Jane Doe", "jane@example.com").await;

    // A retaken email and a bad password are reported together, not one
    // per attempt.
    let response = client(&app)
        .post("/api/signup")
        .json(&json!({
            "full_name": "Other Person",
            "email_address": "jane@example.com",
            "password": "short",
            "password_confirmation": "short",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let errors = errors_of(&response.json());
    assert!(errors.contains(&"Password is too short (minimum is 8 characters)".to_string()));
    assert!(errors.contains(&"Email address has already been taken".to_string()));
}

#[tokio::test]
async fn signup_collects_every_violation() {
    let app = test_router();
    let server = client(&app);

    let response = server
        .post("/api/signup")
        .json(&json!({
            "full_name": "Jane",
            "email_address": "not-an-email",
            "password": "short",
            "password_confirmation": "different",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let errors = errors_of(&response.json());
    assert!(errors.contains(&"Full name must comprise of a first name and a last name".to_string()));
    assert!(errors.contains(&"Email address format is invalid".to_string()));
    assert!(errors.contains(&"Password is too short (minimum is 8 characters)".to_string()));
    assert!(errors.contains(&"Password confirmation doesn't match Password".to_string()));
}

#[tokio::test]
async fn signup_enforces_password_length_bounds() {
    let app = test_router();
    let server = client(&app);

    let long = "a".repeat(21);
    let response = server
        .post("/api/signup")
        .json(&json!({
            "full_name": "Jane Doe",
            "email_address": "jane@example.com",
            "password": long,
            "password_confirmation": long,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        errors_of(&response.json()),
        vec!["Password is too long (maximum is 20 characters)".to_string()]
    );
}

#[tokio::test]
async fn signup_sends_a_confirmation_email() {
    let (app, mailer) = test_router_with_mailer();
    let server = client(&app);
    signup(&server, "Jane Doe", "jane@example.com").await;

    // Delivery happens from a spawned task; poll briefly.
    let mut sent = Vec::new();
    for _ in 0..20 {
        sent = mailer.sent().expect("mailer lock");
        if !sent.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    }
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jane@example.com");
}

#[tokio::test]
async fn login_with_wrong_password_is_generic_401() {
    let app = test_router();
    let server = client(&app);
    signup(&server, "Jane Doe", "jane@example.com").await;

    let other = client(&app);
    let response = other
        .post("/api/login")
        .json(&json!({
            "email_address": "jane@example.com",
            "password": "wrong-password",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        errors_of(&response.json()),
        vec!["Invalid email or password".to_string()]
    );
}

#[tokio::test]
async fn login_with_unknown_email_matches_wrong_password() {
    let app = test_router();
    let server = client(&app);

    let response = server
        .post("/api/login")
        .json(&json!({
            "email_address": "nobody@example.com",
            "password": "password123",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        errors_of(&response.json()),
        vec!["Invalid email or password".to_string()]
    );
}

#[tokio::test]
async fn login_is_case_insensitive_on_email() {
    let app = test_router();
    signup(&client(&app), "Jane Doe", "jane@example.com").await;

    let server = client(&app);
    let response = server
        .post("/api/login")
        .json(&json!({
            "email_address": "JANE@example.com",
            "password": "password123",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let me = server.get("/api/me").await;
    assert_eq!(me.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn login_tolerates_surrounding_whitespace_in_email() {
    let app = test_router();
    signup(&client(&app), "Jane Doe", "jane@example.com").await;

    let server = client(&app);
    let response = server
        .post("/api/login")
        .json(&json!({
            "email_address": "  jane@example.com ",
            "password": "password123",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn me_without_a_session_is_404() {
    let app = test_router();
    let server = client(&app);

    let response = server.get("/api/me").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        errors_of(&response.json()),
        vec!["User Not Found".to_string()]
    );
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = test_router();
    let server = client(&app);
    signup(&server, "Jane Doe", "jane@example.com").await;

    let response = server.delete("/api/logout").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>()["status"][0],
        "Logged out successfully"
    );

    let me = server.get("/api/me").await;
    assert_eq!(me.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_without_a_session_is_401() {
    let app = test_router();
    let server = client(&app);

    let response = server.delete("/api/logout").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

// ═══════════════════════════════════════════════════════════
// Events
// ═══════════════════════════════════════════════════════════

#[tokio::test]
async fn creating_an_event_requires_a_session() {
    let app = test_router();
    let server = client(&app);

    let response = server
        .post("/api/events")
        .json(&json!({
            "event_name": "Picnic",
            "event_location": "Park",
            "event_description": "Bring food",
            "available_spots": 10,
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn created_event_lists_openly_with_organizer() {
    let app = test_router();
    let organizer = client(&app);
    let organizer_body = signup(&organizer, "Jane Doe", "jane@example.com").await;
    let event = create_event(&organizer, "Picnic", 10).await;

    assert_eq!(event["event_name"], "Picnic");
    assert_eq!(event["max_attendees"], 10);
    assert_eq!(event["available_spots"], 10);
    assert_eq!(event["organizer"]["id"], organizer_body["id"]);
    assert_eq!(event["organizer"]["full_name"], "Jane Doe");
    assert!(event["organizer"].get("email_address").is_none());

    // Anonymous visitors see the listing too.
    let visitor = client(&app);
    let response = visitor.get("/api/events").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let listing = response.json::<Value>();
    let events = listing.as_array().expect("events array");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["is_attending"], false);
}

#[tokio::test]
async fn event_capacity_must_be_positive() {
    let app = test_router();
    let server = client(&app);
    signup(&server, "Jane Doe", "jane@example.com").await;

    let response = server
        .post("/api/events")
        .json(&json!({
            "event_name": "Picnic",
            "event_location": "Park",
            "event_description": "Bring food",
            "available_spots": 0,
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        errors_of(&response.json()),
        vec!["Available spots must be greater than 0".to_string()]
    );
}

#[tokio::test]
async fn showing_an_unknown_event_is_404() {
    let app = test_router();
    let server = client(&app);

    let response = server
        .get(&format!("/api/events/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        errors_of(&response.json()),
        vec!["Event Not Found".to_string()]
    );
}

#[tokio::test]
async fn only_the_organizer_can_cancel_an_event() {
    let app = test_router();
    let organizer = client(&app);
    signup(&organizer, "Jane Doe", "jane@example.com").await;
    let event = create_event(&organizer, "Picnic", 10).await;
    let event_id = event["id"].as_str().expect("event id").to_string();

    let intruder = client(&app);
    signup(&intruder, "Evil Eve", "eve@example.com").await;
    let response = intruder.delete(&format!("/api/events/{event_id}")).await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        errors_of(&response.json()),
        vec!["Only the organizer can cancel this event".to_string()]
    );

    let response = organizer.delete(&format!("/api/events/{event_id}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"][0], "Event has been canceled");

    let response = organizer.get(&format!("/api/events/{event_id}")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

// ═══════════════════════════════════════════════════════════
// Attendances
// ═══════════════════════════════════════════════════════════

#[tokio::test]
async fn rsvp_fills_a_spot_and_annotates_the_viewer() {
    let app = test_router();
    let organizer = client(&app);
    signup(&organizer, "Jane Doe", "jane@example.com").await;
    let event = create_event(&organizer, "Picnic", 2).await;
    let event_id = event["id"].as_str().expect("event id").to_string();

    let attendee = client(&app);
    let attendee_body = signup(&attendee, "John Smith", "john@example.com").await;

    let response = attendee
        .post(&format!("/api/events/{event_id}/attendances"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let attendance = response.json::<Value>();
    assert_eq!(attendance["event_id"], event["id"]);
    assert_eq!(attendance["user"]["full_name"], "John Smith");

    let shown = attendee.get(&format!("/api/events/{event_id}")).await;
    let shown = shown.json::<Value>();
    assert_eq!(shown["available_spots"], 1);
    assert_eq!(shown["is_attending"], true);

    // The organizer has not RSVPed.
    let shown = organizer.get(&format!("/api/events/{event_id}")).await;
    assert_eq!(shown.json::<Value>()["is_attending"], false);

    let listing = client(&app)
        .get(&format!("/api/events/{event_id}/attendances"))
        .await;
    assert_eq!(listing.status_code(), StatusCode::OK);
    let listing = listing.json::<Value>();
    let attendees = listing.as_array().expect("attendances array");
    assert_eq!(attendees.len(), 1);
    assert_eq!(attendees[0]["user"]["id"], attendee_body["id"]);
}

#[tokio::test]
async fn rsvp_to_a_full_event_is_rejected_until_a_spot_frees() {
    let app = test_router();
    let organizer = client(&app);
    signup(&organizer, "Jane Doe", "jane@example.com").await;
    let event = create_event(&organizer, "Tiny Dinner", 1).await;
    let event_id = event["id"].as_str().expect("event id").to_string();

    let first = client(&app);
    signup(&first, "John Smith", "john@example.com").await;
    let response = first
        .post(&format!("/api/events/{event_id}/attendances"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let attendance_id = response.json::<Value>()["id"]
        .as_str()
        .expect("attendance id")
        .to_string();

    let second = client(&app);
    signup(&second, "Mary Major", "mary@example.com").await;
    let response = second
        .post(&format!("/api/events/{event_id}/attendances"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        errors_of(&response.json()),
        vec!["Event is at capacity".to_string()]
    );

    // First attendee cancels, freeing the spot.
    let response = first
        .delete(&format!(
            "/api/events/{event_id}/attendances/{attendance_id}"
        ))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"][0], "RSVP has been canceled");

    let response = second
        .post(&format!("/api/events/{event_id}/attendances"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn duplicate_rsvp_is_rejected() {
    let app = test_router();
    let server = client(&app);
    signup(&server, "Jane Doe", "jane@example.com").await;
    let event = create_event(&server, "Picnic", 10).await;
    let event_id = event["id"].as_str().expect("event id").to_string();

    let response = server
        .post(&format!("/api/events/{event_id}/attendances"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = server
        .post(&format!("/api/events/{event_id}/attendances"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        errors_of(&response.json()),
        vec!["You are already attending this event".to_string()]
    );
}

#[tokio::test]
async fn rsvp_to_an_ended_event_is_rejected() {
    let app = test_router();
    let server = client(&app);
    signup(&server, "Jane Doe", "jane@example.com").await;

    let response = server
        .post("/api/events")
        .json(&json!({
            "event_name": "Last Week's Gala",
            "event_location": "Ballroom",
            "event_description": "Already happened",
            "available_spots": 10,
            "event_start": Utc::now() - Duration::hours(2),
            "event_end": Utc::now() - Duration::hours(1),
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let event_id = response.json::<Value>()["id"]
        .as_str()
        .expect("event id")
        .to_string();

    let response = server
        .post(&format!("/api/events/{event_id}/attendances"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        errors_of(&response.json()),
        vec!["Event has already ended".to_string()]
    );
}

#[tokio::test]
async fn only_the_owner_can_cancel_an_rsvp() {
    let app = test_router();
    let organizer = client(&app);
    signup(&organizer, "Jane Doe", "jane@example.com").await;
    let event = create_event(&organizer, "Picnic", 10).await;
    let event_id = event["id"].as_str().expect("event id").to_string();

    let attendee = client(&app);
    signup(&attendee, "John Smith", "john@example.com").await;
    let response = attendee
        .post(&format!("/api/events/{event_id}/attendances"))
        .await;
    let attendance_id = response.json::<Value>()["id"]
        .as_str()
        .expect("attendance id")
        .to_string();

    let response = organizer
        .delete(&format!(
            "/api/events/{event_id}/attendances/{attendance_id}"
        ))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        errors_of(&response.json()),
        vec!["You can only cancel your own RSVP".to_string()]
    );
}

#[tokio::test]
async fn rsvp_addressed_under_the_wrong_event_is_404() {
    let app = test_router();
    let server = client(&app);
    signup(&server, "Jane Doe", "jane@example.com").await;
    let event = create_event(&server, "Picnic", 10).await;
    let other = create_event(&server, "Book Club", 10).await;
    let event_id = event["id"].as_str().expect("event id").to_string();
    let other_id = other["id"].as_str().expect("event id").to_string();

    let response = server
        .post(&format!("/api/events/{event_id}/attendances"))
        .await;
    let attendance_id = response.json::<Value>()["id"]
        .as_str()
        .expect("attendance id")
        .to_string();

    let response = server
        .delete(&format!(
            "/api/events/{other_id}/attendances/{attendance_id}"
        ))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

// ═══════════════════════════════════════════════════════════
// Account deletion
// ═══════════════════════════════════════════════════════════

#[tokio::test]
async fn deleting_an_account_removes_everything_it_owns() {
    let app = test_router();
    let organizer = client(&app);
    signup(&organizer, "Jane Doe", "jane@example.com").await;
    let event = create_event(&organizer, "Picnic", 10).await;
    let event_id = event["id"].as_str().expect("event id").to_string();

    let attendee = client(&app);
    signup(&attendee, "John Smith", "john@example.com").await;
    let response = attendee
        .post(&format!("/api/events/{event_id}/attendances"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = organizer.delete("/api/me").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>()["status"][0],
        "Account has been deleted"
    );

    // The organizer's session is gone.
    let response = organizer.get("/api/me").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // Their event (and its attendances) went with them.
    let response = attendee.get(&format!("/api/events/{event_id}")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let listing = attendee.get("/api/events").await;
    let listing = listing.json::<Value>();
    assert_eq!(listing.as_array().map(Vec::len), Some(0));

    // The attendee can log in again; credentials survive other users'
    // deletions.
    let response = client(&app)
        .post("/api/login")
        .json(&json!({
            "email_address": "john@example.com",
            "password": "password123",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

// ═══════════════════════════════════════════════════════════
// Profiles
// ═══════════════════════════════════════════════════════════

#[tokio::test]
async fn profiles_default_to_empty_and_accept_updates() {
    let app = test_router();
    let server = client(&app);
    let body = signup(&server, "Jane Doe", "jane@example.com").await;
    let user_id = body["id"].as_str().expect("user id").to_string();

    let response = client(&app).get(&format!("/api/profiles/{user_id}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let profile = response.json::<Value>();
    assert_eq!(profile["full_name"], "Jane Doe");
    assert_eq!(profile["avatar"], Value::Null);
    assert_eq!(profile["bio"], Value::Null);

    let response = server
        .put("/api/me/profile")
        .json(&json!({
            "avatar": "https://example.com/jane.png",
            "bio": "Organizer of picnics.",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = client(&app).get(&format!("/api/profiles/{user_id}")).await;
    let profile = response.json::<Value>();
    assert_eq!(profile["avatar"], "https://example.com/jane.png");
    assert_eq!(profile["bio"], "Organizer of picnics.");
}

#[tokio::test]
async fn profile_update_requires_a_session() {
    let app = test_router();
    let server = client(&app);

    let response = server
        .put("/api/me/profile")
        .json(&json!({"avatar": null, "bio": "anonymous"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_of_an_unknown_user_is_404() {
    let app = test_router();
    let server = client(&app);

    let response = server
        .get(&format!("/api/profiles/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

// ═══════════════════════════════════════════════════════════
// Operational
// ═══════════════════════════════════════════════════════════

#[tokio::test]
async fn health_reports_healthy() {
    let app = test_router();
    let server = client(&app);

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn responses_echo_a_correlation_id() {
    let app = test_router();
    let server = client(&app);

    let response = server.get("/health").await;
    assert!(response.headers().contains_key("x-correlation-id"));
}
