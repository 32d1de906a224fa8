use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use tab_timers::{
    create_router,
    services::RecordingAlert,
    state::{AppState, TimerBoard},
    storage::{MemoryStore, Persistence},
};

fn setup() -> (Router, Arc<AppState>) {
    let persistence = Persistence::new(Box::new(MemoryStore::new()));
    let state = Arc::new(
        AppState::new(TimerBoard::new(), persistence, Arc::new(RecordingAlert::new()))
            .with_server("127.0.0.1", 20554),
    );
    (create_router(Arc::clone(&state)), state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn first_timer_id(board: &Value) -> u64 {
    board["timers"][0]["id"].as_u64().unwrap()
}

#[tokio::test]
async fn state_shows_default_board() {
    let (app, _) = setup();
    let (status, board) = send(&app, Method::GET, "/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["layout"], "list");
    assert_eq!(board["theme"], "theme-dark");
    assert_eq!(board["tabs"].as_array().unwrap().len(), 1);
    assert_eq!(board["timers"][0]["display"], "00:01:00");
    assert_eq!(board["timers"][0]["editMinutes"], 1);
    assert_eq!(board["title"], "Tab Timers");
}

#[tokio::test]
async fn health_and_status() {
    let (app, _) = setup();
    let (status, health) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["groups"], 1);
    assert_eq!(body["timers"], 1);
    assert_eq!(body["storage"], "MemoryStore");
    assert_eq!(body["port"], 20554);
}

#[tokio::test]
async fn group_lifecycle() {
    let (app, _) = setup();

    let (status, created) = send(&app, Method::POST, "/groups", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["board"]["activeTabName"], "Tab 2");
    let first_tab = created["board"]["tabs"][0]["id"].as_u64().unwrap();

    let (_, named) = send(&app, Method::POST, "/groups", Some(json!({"name": "Kitchen"}))).await;
    assert_eq!(named["board"]["activeTabName"], "Kitchen");

    let (status, renamed) = send(&app, Method::PUT, "/groups/active/name", Some(json!({"name": "Oven"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["board"]["tabs"][2]["name"], "Oven");

    let (status, _) = send(&app, Method::DELETE, "/groups/active", None).await;
    assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);

    let (status, deleted) = send(&app, Method::DELETE, "/groups/active?confirm=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["board"]["activeTabId"].as_u64(), Some(first_tab));
    assert_eq!(deleted["board"]["tabs"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, Method::POST, "/groups/12345/activate", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn last_group_cannot_be_deleted() {
    let (app, _) = setup();
    let (status, body) = send(&app, Method::DELETE, "/groups/active?confirm=true", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "You must have at least one tab.");

    let (_, board) = send(&app, Method::GET, "/state", None).await;
    assert_eq!(board["tabs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn timer_editing_and_fields() {
    let (app, _) = setup();
    let (_, board) = send(&app, Method::GET, "/state", None).await;
    let id = first_timer_id(&board);

    let (status, body) = send(&app, Method::POST, &format!("/timers/{}/edit", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["board"]["timers"][0]["isEditing"], true);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/timers/{}/duration", id),
        Some(json!({"hours": "", "minutes": "1", "seconds": 30})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let timer = &body["board"]["timers"][0];
    assert_eq!(timer["totalDuration"], 90);
    assert_eq!(timer["remaining"], 90);
    assert_eq!(timer["isEditing"], false);
    assert_eq!(timer["display"], "00:01:30");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/timers/{}", id),
        Some(json!({"name": "Tea", "sound": "alarm"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["board"]["timers"][0]["name"], "Tea");
    assert_eq!(body["board"]["timers"][0]["sound"], "alarm");

    let (_, body) = send(&app, Method::PATCH, &format!("/timers/{}", id), Some(json!({"sound": "gong"}))).await;
    assert_eq!(body["board"]["timers"][0]["sound"], "none");

    let (status, _) = send(&app, Method::PATCH, "/timers/1", Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn toggle_reset_and_delete_timers() {
    let (app, state) = setup();
    let (_, added) = send(&app, Method::POST, "/groups/active/timers", None).await;
    let timers = added["board"]["timers"].as_array().unwrap();
    assert_eq!(timers.len(), 2);
    assert_eq!(timers[1]["name"], "Timer 2");
    let id = timers[1]["id"].as_u64().unwrap();

    let (_, body) = send(&app, Method::POST, &format!("/timers/{}/toggle", id), None).await;
    assert_eq!(body["board"]["timers"][1]["isRunning"], true);

    state.tick(1).unwrap();
    let (_, board) = send(&app, Method::GET, "/state", None).await;
    assert_eq!(board["timers"][1]["remaining"], 59);
    assert_eq!(board["title"], "00:00:59 · Tab Timers");

    let (_, body) = send(&app, Method::POST, &format!("/timers/{}/reset", id), None).await;
    assert_eq!(body["board"]["timers"][1]["isRunning"], false);
    assert_eq!(body["board"]["timers"][1]["remaining"], 60);

    let (status, body) = send(&app, Method::DELETE, &format!("/timers/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["board"]["timers"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/timers/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::POST, &format!("/timers/{}/toggle", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn settings_and_reset() {
    let (app, _) = setup();
    let (status, body) = send(&app, Method::PUT, "/settings/theme", Some(json!({"theme": "theme-light"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["board"]["theme"], "theme-light");

    let (status, body) = send(&app, Method::PUT, "/settings/layout", Some(json!({"layout": "grid"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["board"]["layout"], "grid");

    let (status, _) = send(&app, Method::PUT, "/settings/layout", Some(json!({"layout": "spiral"}))).await;
    assert!(status.is_client_error());

    let (status, _) = send(&app, Method::POST, "/reset", None).await;
    assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);

    let (status, body) = send(&app, Method::POST, "/reset?confirm=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["board"]["theme"], "theme-dark");
    assert_eq!(body["board"]["layout"], "list");
}

#[tokio::test]
async fn editing_timer_cannot_be_started() {
    let (app, _) = setup();
    let (_, board) = send(&app, Method::GET, "/state", None).await;
    let id = first_timer_id(&board);

    send(&app, Method::POST, &format!("/timers/{}/edit", id), None).await;
    let (status, body) = send(&app, Method::POST, &format!("/timers/{}/toggle", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");

    let (_, board) = send(&app, Method::GET, "/state", None).await;
    assert_eq!(board["timers"][0]["isRunning"], false);
    assert_eq!(board["timers"][0]["isEditing"], true);
}
