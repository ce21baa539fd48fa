// Runs the Ollama classifier against a local axum stub speaking the
// /api/generate and /api/tags wire format.

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use neuralcord_core::{ChatMessage, ContextWindow, Decision, FilterConfig};
use neuralcord_filter::{
    ClassifierClient, ClassifierError, CompletionRequest, FilterGate, OllamaClassifier,
};

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

async fn generate(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["stream"] != json!(false) || body["model"].as_str().is_none() {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad request"})));
    }
    let reply = if body["prompt"].as_str().unwrap_or("").contains("spicy") {
        "INAPPROPRIATE\n[SUMMARY]\nnot suitable"
    } else {
        "[RESPOND]\n[SUMMARY]\nopen question to the room"
    };
    (
        StatusCode::OK,
        Json(json!({"model": body["model"], "response": reply, "done": true})),
    )
}

async fn tags() -> Json<Value> {
    Json(json!({"models": [{"name": "mistral:latest"}, {"name": "llama3:8b"}]}))
}

fn healthy() -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/tags", get(tags))
}

fn request(prompt: &str) -> CompletionRequest {
    CompletionRequest {
        model: "mistral".to_string(),
        prompt: prompt.to_string(),
    }
}

#[tokio::test]
async fn complete_returns_response_field() {
    let endpoint = spawn(healthy()).await;
    let client = OllamaClassifier::new(Some(endpoint));

    let text = client.complete(&request("hello")).await.unwrap();
    assert_eq!(text, "[RESPOND]\n[SUMMARY]\nopen question to the room");
}

#[tokio::test]
async fn list_and_check_models() {
    let endpoint = spawn(healthy()).await;
    let client = OllamaClassifier::new(Some(endpoint));

    let models = client.list_models().await.unwrap();
    assert_eq!(models, vec!["mistral:latest".to_string(), "llama3:8b".to_string()]);
    assert!(client.check_model_available("mistral").await.unwrap());
    assert!(!client.check_model_available("phi3").await.unwrap());
}

#[tokio::test]
async fn non_success_status_is_api_error() {
    let router = Router::new().route(
        "/api/generate",
        post(|| async { (StatusCode::NOT_FOUND, "model 'mistral' not found") }),
    );
    let endpoint = spawn(router).await;
    let client = OllamaClassifier::new(Some(endpoint));

    let err = client.complete(&request("hello")).await.unwrap_err();
    match &err {
        ClassifierError::Api { status, message } => {
            assert_eq!(*status, 404);
            assert!(message.contains("not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn unreachable_service_is_unavailable() {
    // nothing listens on port 9 (discard) on a test host
    let client = OllamaClassifier::new(Some("http://127.0.0.1:9/api".to_string()));
    let err = client.complete(&request("hello")).await.unwrap_err();
    assert!(err.is_unavailable(), "got {err}");
}

fn window(author: &str, content: &str) -> ContextWindow {
    ContextWindow::new(vec![ChatMessage::new("1", author, content, Utc::now())])
}

#[tokio::test]
async fn gate_end_to_end_over_http() {
    let endpoint = spawn(healthy()).await;
    let config = FilterConfig {
        endpoint: endpoint.clone(),
        ..FilterConfig::default()
    };
    let gate = FilterGate::with_ollama(config);

    let decision = gate.evaluate(&window("Sam", "anyone know a good pasta recipe?"), "Aria").await;
    assert_eq!(
        decision,
        Decision::Respond(
            "*Context of the current conversation:\nSam: anyone know a good pasta recipe?*\n\nSam: anyone know a good pasta recipe?"
                .to_string()
        )
    );

    let decision = gate.evaluate(&window("Sam", "say something spicy about cats"), "Aria").await;
    assert_eq!(decision, Decision::Inappropriate(Some("not suitable".to_string())));

    assert!(gate.set_model("llama3:8b").await);
    assert_eq!(gate.model().await, "llama3:8b");
}

#[tokio::test]
async fn gate_ignores_when_service_down() {
    let endpoint = "http://127.0.0.1:9/api".to_string();
    let gate = FilterGate::new(
        Box::new(OllamaClassifier::new(Some(endpoint))),
        FilterConfig::default(),
    );
    let decision = gate.evaluate(&window("Sam", "anyone know a good pasta recipe?"), "Aria").await;
    assert_eq!(decision, Decision::Ignore(None));
    assert!(!gate.set_model("llama3").await);
}
