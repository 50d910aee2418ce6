//! Request and response handling against a one-shot local HTTP stub

use std::sync::Arc;

use mealplan_survey_http::{ClientConfig, HttpApi, TokenStore};
use mealplan_survey_types::{
    ApiError, AuthProvider, QuestionnaireApi, Registration, Response, SystemPromptDraft, UserInfo,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Accept one connection, answer it with `status` and `body`, and return the raw request.
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
            if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                let content_length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });

    (base_url, handle)
}

fn client(base_url: &str, store: Arc<TokenStore>) -> HttpApi {
    HttpApi::new(ClientConfig::default().with_base_url(base_url), store).unwrap()
}

#[tokio::test]
async fn test_fetch_questions_sends_bearer_token() {
    let body = json!([{
        "id": 1,
        "text": "What is your full name?",
        "category": "personal_info",
        "question_type": "text",
        "options": null,
        "validation": {"required": true},
        "field_key": "personalInfo.fullName",
        "order": 1
    }]);
    let (base_url, server) = serve_once("200 OK", body.to_string()).await;
    let api = client(&base_url, Arc::new(TokenStore::with_token("abc123")));

    let questions = api.fetch_questions().await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].field_key.as_str(), "personalInfo.fullName");

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/questions HTTP/1.1"));
    assert!(request.to_lowercase().contains("authorization: bearer abc123"));
}

#[tokio::test]
async fn test_unauthorized_clears_token() {
    let (base_url, server) =
        serve_once("401 Unauthorized", json!({"detail": "Not authenticated"}).to_string()).await;
    let store = Arc::new(TokenStore::with_token("stale"));
    let api = client(&base_url, store.clone());

    let err = api.fetch_responses().await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert_eq!(store.token(), None);
    assert!(store.is_expired());
    server.await.unwrap();
}

#[tokio::test]
async fn test_save_wraps_responses() {
    let (base_url, server) = serve_once("200 OK", json!({"status": "ok"}).to_string()).await;
    let api = client(&base_url, Arc::new(TokenStore::new()));

    api.save_responses(&[Response::new(4, 36), Response::new(10, json!(["Maintenance"]))])
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/questions/responses HTTP/1.1"));
    let body = request.split("\r\n\r\n").nth(1).unwrap();
    let body: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        body,
        json!({"responses": [
            {"question_id": 4, "answer": 36},
            {"question_id": 10, "answer": ["Maintenance"]}
        ]})
    );
}

#[tokio::test]
async fn test_generate_surfaces_server_detail() {
    let (base_url, server) = serve_once(
        "500 Internal Server Error",
        json!({"detail": "Error generating meal plan: rate limited"}).to_string(),
    )
    .await;
    let api = client(&base_url, Arc::new(TokenStore::new()));

    let err = api
        .generate_meal_plan(&UserInfo::new(), &[Response::new(1, "Ada")])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "Error generating meal plan: rate limited");

    let request = server.await.unwrap();
    assert!(request.contains(r#""user_info":{}"#));
}

#[tokio::test]
async fn test_login_stores_token() {
    let (base_url, server) = serve_once(
        "200 OK",
        json!({"access_token": "fresh", "token_type": "bearer"}).to_string(),
    )
    .await;
    let store = Arc::new(TokenStore::new());
    let api = client(&base_url, store.clone());

    api.login("ada@example.com", "hunter2").await.unwrap();
    assert_eq!(store.token().as_deref(), Some("fresh"));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/users/login HTTP/1.1"));
    assert!(request.contains("username=ada%40example.com&password=hunter2"));
}

#[tokio::test]
async fn test_login_rejected() {
    let (base_url, server) =
        serve_once("401 Unauthorized", json!({"detail": "Incorrect"}).to_string()).await;
    let api = client(&base_url, Arc::new(TokenStore::new()));

    let err = api.login("ada@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.message(), "Invalid email or password");
    server.await.unwrap();

    let (base_url, server) = serve_once(
        "403 Forbidden",
        json!({"detail": "Please verify your email first"}).to_string(),
    )
    .await;
    let api = client(&base_url, Arc::new(TokenStore::new()));
    let err = api.login("ada@example.com", "hunter2").await.unwrap_err();
    assert_eq!(err.message(), "Please verify your email first");
    server.await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api", listener.local_addr().unwrap());
    drop(listener);

    let api = client(&base_url, Arc::new(TokenStore::new()));
    assert!(matches!(
        api.fetch_questions().await,
        Err(ApiError::Transport(_))
    ));
}

fn request_body(request: &str) -> serde_json::Value {
    serde_json::from_str(request.split("\r\n\r\n").nth(1).unwrap()).unwrap()
}

#[tokio::test]
async fn test_register_posts_credentials_without_token() {
    let (base_url, server) = serve_once(
        "201 Created",
        json!({
            "id": 7,
            "email": "ada@example.com",
            "is_admin": false,
            "is_active": true,
            "created_at": "2024-05-01T10:00:00",
            "message": "Registration successful! Your account is pending administrator approval."
        })
        .to_string(),
    )
    .await;
    let api = client(&base_url, Arc::new(TokenStore::with_token("someone-else")));

    let account = api
        .register(Registration::new(" ada@example.com", "hunter22"))
        .await
        .unwrap();
    assert_eq!(account.id, 7);
    assert!(account.message.unwrap().contains("pending administrator approval"));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/users/register HTTP/1.1"));
    assert!(!request.to_lowercase().contains("authorization:"));
    assert_eq!(
        request_body(&request),
        json!({"email": "ada@example.com", "password": "hunter22"})
    );
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (base_url, server) = serve_once(
        "400 Bad Request",
        json!({"detail": "Email already registered"}).to_string(),
    )
    .await;
    let api = client(&base_url, Arc::new(TokenStore::new()));

    let err = api
        .register(Registration::new("ada@example.com", "hunter22"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "Email already registered");
    server.await.unwrap();
}

#[tokio::test]
async fn test_pending_users_and_approval() {
    let body = json!([
        {"id": 7, "email": "ada@example.com", "full_name": "", "created_at": "2024-05-01T10:00:00"},
        {"email": "missing-id@example.com"}
    ]);
    let (base_url, server) = serve_once("200 OK", body.to_string()).await;
    let api = client(&base_url, Arc::new(TokenStore::with_token("admin")));

    let pending = api.admin().pending_users().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].email, "ada@example.com");
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/admin/users/pending HTTP/1.1"));

    let (base_url, server) = serve_once(
        "200 OK",
        json!({"message": "User approved successfully"}).to_string(),
    )
    .await;
    let api = client(&base_url, Arc::new(TokenStore::with_token("admin")));
    api.admin().approve_user(7).await.unwrap();
    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/admin/users/7/approve HTTP/1.1"));

    let (base_url, server) =
        serve_once("404 Not Found", json!({"detail": "User not found"}).to_string()).await;
    let api = client(&base_url, Arc::new(TokenStore::with_token("admin")));
    let err = api.admin().reject_user(99).await.unwrap_err();
    assert_eq!(err.message(), "User not found");
    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/admin/users/99/reject HTTP/1.1"));
}

#[tokio::test]
async fn test_toggle_admin_returns_updated_account() {
    let (base_url, server) = serve_once(
        "200 OK",
        json!({"id": 3, "email": "bob@example.com", "is_admin": true, "is_active": true}).to_string(),
    )
    .await;
    let api = client(&base_url, Arc::new(TokenStore::with_token("admin")));

    let account = api.admin().toggle_user_admin(3).await.unwrap();
    assert!(account.is_admin);
    let request = server.await.unwrap();
    assert!(request.starts_with("PUT /api/users/toggle-admin/3 HTTP/1.1"));

    let (base_url, server) =
        serve_once("404 Not Found", json!({"detail": "User not found"}).to_string()).await;
    let api = client(&base_url, Arc::new(TokenStore::with_token("admin")));
    let err = api.admin().toggle_user_active(42).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    let request = server.await.unwrap();
    assert!(request.starts_with("PUT /api/users/toggle-active/42 HTTP/1.1"));
}

#[tokio::test]
async fn test_create_system_prompt_sends_normalized_draft() {
    let (base_url, server) = serve_once(
        "200 OK",
        json!({
            "id": 2,
            "name": "Default",
            "prompt_text": "You are a nutritionist.",
            "description": null,
            "is_active": true,
            "created_by_id": 1
        })
        .to_string(),
    )
    .await;
    let api = client(&base_url, Arc::new(TokenStore::with_token("admin")));

    let draft = SystemPromptDraft::new(" Default ", "You are a nutritionist.").with_description("");
    let prompt = api.admin().create_system_prompt(draft).await.unwrap();
    assert_eq!(prompt.id, 2);
    assert_eq!(prompt.created_by_id, Some(1));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/admin/system-prompts HTTP/1.1"));
    assert_eq!(
        request_body(&request),
        json!({"name": "Default", "prompt_text": "You are a nutritionist."})
    );
}

#[tokio::test]
async fn test_toggle_system_prompt_active() {
    let (base_url, server) = serve_once(
        "200 OK",
        json!({"id": 2, "name": "Default", "prompt_text": "p", "is_active": false}).to_string(),
    )
    .await;
    let api = client(&base_url, Arc::new(TokenStore::with_token("admin")));

    let prompt = api.admin().toggle_system_prompt_active(2).await.unwrap();
    assert!(!prompt.is_active);
    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/admin/system-prompts/2/toggle-active HTTP/1.1"));
}

#[tokio::test]
async fn test_invalid_system_prompt_is_not_sent() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api", listener.local_addr().unwrap());
    drop(listener);
    let api = client(&base_url, Arc::new(TokenStore::with_token("admin")));

    let err = api
        .admin()
        .update_system_prompt(2, SystemPromptDraft::new("Default", "  "))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.message(), "Please fill in all required fields: prompt_text");
}
