//! Club console JSON API.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use oeiras_cloud::Backends;
use oeiras_integration_tests::{
    ADMIN_PASSWORD, ClubHarness, RecordingMailer, body_json, body_text, club,
};
use serde_json::{Value, json};

async fn signed_in(backends: Backends, mailer: RecordingMailer) -> ClubHarness {
    let mut console = club(backends, mailer);
    let response = console
        .client
        .post_json(
            "/api/auth/login",
            &json!({"username": "admin", "password": ADMIN_PASSWORD}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, json!({"success": true, "username": "admin"}));
    console
}

fn player(name: &str, age: u32) -> Value {
    json!({
        "name": name,
        "age": age,
        "team": "Sub-13",
        "jerseyNumber": 7,
        "email": "familia@example.pt"
    })
}

#[tokio::test]
async fn test_api_requires_session() {
    let mut console = club(Backends::in_memory(), RecordingMailer::new());

    for path in ["/api/players", "/api/coaches", "/api/coordinators", "/api/auth/me"] {
        let response = console.client.get(path).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(body_json(response).await, json!({"error": "Unauthorized"}));
    }

    let response = console
        .client
        .post_json("/api/players", &player("Rui", 12))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = console
        .client
        .post_json(
            "/api/send-email",
            &json!({"email": "a@example.pt", "subject": "s", "message": "m"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejections() {
    let mut console = club(Backends::in_memory(), RecordingMailer::new());

    let response = console
        .client
        .post_json("/api/auth/login", &json!({"username": "admin", "password": "nope"}))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "Incorrect username or password."
    );

    let response = console
        .client
        .post_json(
            "/api/auth/login",
            &json!({"username": "visitor", "password": ADMIN_PASSWORD}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["error"],
        "Access denied. Admin privileges required."
    );

    let response = console
        .client
        .post_json("/api/auth/login", &json!({"username": "", "password": "x"}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid input format");

    assert_eq!(
        console.client.get("/api/auth/me").await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_new_password_challenge() {
    let mut console = club(Backends::in_memory(), RecordingMailer::new());

    let response = console
        .client
        .post_json(
            "/api/auth/login",
            &json!({"username": "newbie", "password": ADMIN_PASSWORD}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["challenge"], "NEW_PASSWORD_REQUIRED");
    let challenge = body["session"].as_str().unwrap().to_string();

    assert_eq!(
        console.client.get("/api/auth/me").await.status(),
        StatusCode::UNAUTHORIZED
    );

    let response = console
        .client
        .post_json(
            "/api/auth/new-password",
            &json!({"username": "newbie", "newPassword": "a-better-one", "session": "stale"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = console
        .client
        .post_json(
            "/api/auth/new-password",
            &json!({"username": "newbie", "newPassword": "a-better-one", "session": challenge}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "newbie");

    let me = body_json(console.client.get("/api/auth/me").await).await;
    assert_eq!(me["username"], "newbie");
    assert!(me["loggedInAt"].is_string());
}

#[tokio::test]
async fn test_logout_closes_session() {
    let mut console = signed_in(Backends::in_memory(), RecordingMailer::new()).await;
    assert_eq!(
        console.client.get("/api/players").await.status(),
        StatusCode::OK
    );

    let response = console.client.post_json("/api/auth/logout", &json!({})).await;
    assert_eq!(body_json(response).await, json!({"success": true}));

    assert_eq!(
        console.client.get("/api/players").await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_player_crud() {
    let mut console = signed_in(Backends::in_memory(), RecordingMailer::new()).await;

    let body = body_json(console.client.get("/api/players").await).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["degraded"], false);
    assert!(body["players"].as_array().unwrap().is_empty());

    let response = console
        .client
        .post_json("/api/players", &player("Rui Costa", 12))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await["player"].clone();
    let id = created["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("player_"));
    assert_eq!(created["jerseyNumber"], 7);
    assert!(created["createdAt"].is_string());

    let shown = body_json(console.client.get(&format!("/api/players/{id}")).await).await;
    assert_eq!(shown["player"]["name"], "Rui Costa");

    let response = console
        .client
        .put_json(&format!("/api/players/{id}"), &player("Rui Costa", 13))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["player"].clone();
    assert_eq!(updated["age"], 13);
    assert_eq!(updated["id"], id.as_str());
    assert!(updated["updatedAt"].is_string());

    let body = body_json(console.client.get("/api/players").await).await;
    assert_eq!(body["players"].as_array().unwrap().len(), 1);

    let response = console.client.delete(&format!("/api/players/{id}")).await;
    assert_eq!(body_json(response).await, json!({"success": true}));

    let response = console.client.get(&format!("/api/players/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "No player with that id");

    let response = console.client.delete(&format!("/api/players/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"success": true}));
}

#[tokio::test]
async fn test_player_validation() {
    let mut console = signed_in(Backends::in_memory(), RecordingMailer::new()).await;

    for bad in [
        player("Rui", 2),
        player("Rui", 100),
        player("", 12),
        json!({"name": "Rui", "age": 12, "team": "Sub-13", "email": "not-an-email"}),
        json!({"name": "Rui"}),
    ] {
        let response = console.client.post_json("/api/players", &bad).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{bad}");
        assert!(body_json(response).await["error"].is_string());
    }

    let body = body_json(console.client.get("/api/players").await).await;
    assert!(body["players"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_missing_record_is_not_found() {
    let mut console = signed_in(Backends::in_memory(), RecordingMailer::new()).await;
    let response = console
        .client
        .put_json("/api/players/player_0_missing", &player("Rui", 12))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_coaches_and_coordinators() {
    let mut console = signed_in(Backends::in_memory(), RecordingMailer::new()).await;

    let response = console
        .client
        .post_json(
            "/api/coaches",
            &json!({"name": "Marta Lopes", "team": "Sub-15", "mobile": "+351 912 345 678"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let coach = body_json(response).await["coach"].clone();
    assert!(coach["id"].as_str().unwrap().starts_with("coach_"));

    let response = console
        .client
        .post_json(
            "/api/coordinators",
            &json!({"name": "Paulo Reis", "area": "Formação", "email": "paulo@example.pt"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let coordinator = body_json(response).await["coordinator"].clone();
    assert!(coordinator["id"].as_str().unwrap().starts_with("coordinator_"));

    let coaches = body_json(console.client.get("/api/coaches").await).await;
    assert_eq!(coaches["coaches"].as_array().unwrap().len(), 1);
    let coordinators = body_json(console.client.get("/api/coordinators").await).await;
    assert_eq!(coordinators["coordinators"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_flags_degraded_reads() {
    let mut console = signed_in(Backends::offline(), RecordingMailer::new()).await;

    let response = console
        .client
        .post_json("/api/players", &player("Rui Costa", 12))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(console.client.get("/api/players").await).await;
    assert_eq!(body["degraded"], true);
    assert_eq!(body["players"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_send_email() {
    let mut console = signed_in(Backends::in_memory(), RecordingMailer::new()).await;

    let response = console
        .client
        .post_json(
            "/api/send-email",
            &json!({"email": "pais@example.pt", "subject": "Treino", "message": "Sábado às 10h"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["messageId"], "message-1");
    assert_eq!(body["message"], "Email sent successfully");

    let sent = console.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "pais@example.pt");
    assert!(sent[0].html_body.is_none());

    let response = console
        .client
        .post_json(
            "/api/send-email",
            &json!({"email": "nobody", "subject": "Treino", "message": "x"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_email_transport_failure() {
    let mut console = signed_in(Backends::in_memory(), RecordingMailer::failing()).await;
    let response = console
        .client
        .post_json(
            "/api/send-email",
            &json!({"email": "pais@example.pt", "subject": "Treino", "message": "x"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"], "Failed to send email");
}

#[tokio::test]
async fn test_health_endpoints() {
    let mut console = club(Backends::offline(), RecordingMailer::new());
    assert_eq!(body_text(console.client.get("/health").await).await, "ok");
    assert_eq!(
        console.client.get("/health/ready").await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}
