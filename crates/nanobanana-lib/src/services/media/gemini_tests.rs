//! Gemini client tests against a local fake API server
//!
//! The server is an axum router with a single fallback handler; each test
//! supplies a responder mapping the request to a status and body.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use super::entitlement::KeySelector;
use super::gemini::{GeminiConfig, GeminiMediaClient};
use super::{MediaBackend, MediaError};
use crate::models::{AspectRatio, AssetRef, Lighting, PromptConfig};

// ============================================================================
// Fake server
// ============================================================================

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: String,
    body: Value,
}

type Responder = Box<dyn Fn(&Recorded, usize) -> (u16, String) + Send + Sync>;

struct FakeApi {
    requests: Mutex<Vec<Recorded>>,
    polls: AtomicUsize,
    respond: Responder,
}

impl FakeApi {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(
    State(fake): State<Arc<FakeApi>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let recorded = Recorded {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    let polls = if recorded.path.contains("/operations/") {
        fake.polls.fetch_add(1, Ordering::SeqCst) + 1
    } else {
        fake.polls.load(Ordering::SeqCst)
    };
    fake.requests.lock().unwrap().push(recorded.clone());

    let (status, body) = (fake.respond)(&recorded, polls);
    (StatusCode::from_u16(status).unwrap(), body).into_response()
}

/// Start a fake API; `make` receives the server's base URL
async fn serve(make: impl FnOnce(String) -> Responder) -> (String, Arc<FakeApi>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let fake = Arc::new(FakeApi {
        requests: Mutex::new(Vec::new()),
        polls: AtomicUsize::new(0),
        respond: make(base.clone()),
    });
    let router = Router::new().fallback(handle).with_state(fake.clone());

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    (base, fake)
}

fn client(base: &str, host: Arc<KeySelector>, cache: &TempDir) -> GeminiMediaClient {
    let mut config = GeminiConfig::new(Some("free-key".to_string()), cache.path().to_path_buf());
    config.endpoint = format!("{}/v1beta", base);
    config.text_model = "text-model".to_string();
    config.image_model = "image-model".to_string();
    config.video_model = "video-model".to_string();
    config.poll_interval = Duration::from_millis(10);
    config.request_timeout = Duration::from_secs(5);
    GeminiMediaClient::new(config, host)
}

fn ok(body: Value) -> (u16, String) {
    (200, body.to_string())
}

fn not_found() -> (u16, String) {
    (
        404,
        json!({"error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}})
            .to_string(),
    )
}

// ============================================================================
// Prompt optimization and images
// ============================================================================

#[tokio::test]
async fn test_optimize_prompt_request_and_trim() {
    let (base, fake) = serve(|_| {
        Box::new(|_: &Recorded, _: usize| {
            ok(json!({"candidates": [{"content": {"parts": [{"text": "  A red fox, golden hour.\n"}]}}]}))
        })
    })
    .await;
    let cache = TempDir::new().unwrap();
    let c = client(&base, Arc::new(KeySelector::new()), &cache);

    let config = PromptConfig {
        concept: "a red fox in snow".to_string(),
        lighting: Lighting::GoldenMagicHour,
        ..Default::default()
    };
    let prompt = c.optimize_prompt(&config).await.unwrap();
    assert_eq!(prompt, "A red fox, golden hour.");

    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/v1beta/models/text-model:generateContent");
    assert_eq!(request.query, "key=free-key");
    assert_eq!(request.body["contents"][0]["parts"][0]["text"], "Concept: a red fox in snow");
    let instruction = request.body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(instruction.contains("Golden Magic Hour"));
    assert!(instruction.contains("soft organic shadows"));
}

#[tokio::test]
async fn test_optimize_prompt_falls_back_to_concept() {
    let (base, _) = serve(|_| Box::new(|_: &Recorded, _: usize| ok(json!({"candidates": []})))).await;
    let cache = TempDir::new().unwrap();
    let c = client(&base, Arc::new(KeySelector::new()), &cache);

    let config = PromptConfig {
        concept: "a red fox in snow".to_string(),
        ..Default::default()
    };
    assert_eq!(c.optimize_prompt(&config).await.unwrap(), "a red fox in snow");
}

#[tokio::test]
async fn test_generate_image_returns_data_url() {
    let (base, fake) = serve(|_| {
        Box::new(|_: &Recorded, _: usize| {
            ok(json!({"candidates": [{"content": {"parts": [
                {"text": "Here you go"},
                {"inlineData": {"mimeType": "image/png", "data": "iVBORw0K"}}
            ]}}]}))
        })
    })
    .await;
    let cache = TempDir::new().unwrap();
    let c = client(&base, Arc::new(KeySelector::new()), &cache);

    let asset = c.generate_image("A red fox", AspectRatio::Portrait9x16).await.unwrap();
    assert_eq!(asset, AssetRef::DataUrl("data:image/png;base64,iVBORw0K".to_string()));

    let request = &fake.requests()[0];
    assert_eq!(request.path, "/v1beta/models/image-model:generateContent");
    assert_eq!(request.body["generationConfig"]["imageConfig"]["aspectRatio"], "9:16");
}

#[tokio::test]
async fn test_generate_image_without_image_part() {
    let (base, _) = serve(|_| {
        Box::new(|_: &Recorded, _: usize| ok(json!({"candidates": [{"content": {"parts": [{"text": "blocked"}]}}]})))
    })
    .await;
    let cache = TempDir::new().unwrap();
    let c = client(&base, Arc::new(KeySelector::new()), &cache);

    let result = c.generate_image("A red fox", AspectRatio::Square1x1).await;
    assert!(matches!(result, Err(MediaError::NoImageData)));
}

#[tokio::test]
async fn test_api_error_is_structured() {
    let (base, _) = serve(|_| Box::new(|_: &Recorded, _: usize| not_found())).await;
    let cache = TempDir::new().unwrap();
    let c = client(&base, Arc::new(KeySelector::new()), &cache);

    let err = c
        .generate_image("A red fox", AspectRatio::Square1x1)
        .await
        .unwrap_err();
    assert!(err.is_entitlement_missing());
    assert!(!err.to_user_message().contains("free-key"));
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let cache = TempDir::new().unwrap();
    let c = client(&base, Arc::new(KeySelector::new()), &cache);
    let err = c
        .generate_image("A red fox", AspectRatio::Square1x1)
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::ConnectionFailed(_)));
    assert!(!err.to_string().contains("free-key"));
}

// ============================================================================
// Video jobs
// ============================================================================

fn video_responder(base: String, polls_until_done: usize) -> Responder {
    Box::new(move |request: &Recorded, polls: usize| {
        if request.path.ends_with(":predictLongRunning") {
            return ok(json!({"name": "operations/op-1", "done": false}));
        }
        if request.path == "/v1beta/operations/op-1" {
            if polls < polls_until_done {
                return ok(json!({"name": "operations/op-1", "done": false}));
            }
            return ok(json!({
                "name": "operations/op-1",
                "done": true,
                "response": {"generateVideoResponse": {"generatedSamples": [
                    {"video": {"uri": format!("{}/files/clip:download?alt=media", base)}}
                ]}}
            }));
        }
        if request.path == "/files/clip:download" {
            return (200, "MP4DATA".to_string());
        }
        (500, "unexpected".to_string())
    })
}

#[tokio::test]
async fn test_video_job_polls_then_downloads() {
    let (base, fake) = serve(|base| video_responder(base, 3)).await;
    let cache = TempDir::new().unwrap();
    let host = Arc::new(KeySelector::with_key("paid-key"));
    let c = client(&base, host.clone(), &cache);

    let asset = c
        .generate_video("A red fox", AspectRatio::Landscape16x9, &CancellationToken::new())
        .await
        .unwrap();

    let path = match asset {
        AssetRef::File(path) => path,
        other => panic!("unexpected asset: {:?}", other),
    };
    assert!(path.starts_with(cache.path().join("videos")));
    assert_eq!(std::fs::read(&path).unwrap(), b"MP4DATA");
    assert_eq!(host.selection_requests(), 0);

    let requests = fake.requests();
    let submit = &requests[0];
    assert_eq!(submit.path, "/v1beta/models/video-model:predictLongRunning");
    assert_eq!(submit.query, "key=paid-key");
    assert_eq!(submit.body["instances"][0]["prompt"], "A red fox");
    assert_eq!(submit.body["parameters"]["resolution"], "720p");
    assert_eq!(submit.body["parameters"]["aspectRatio"], "16:9");
    assert_eq!(submit.body["parameters"]["sampleCount"], 1);

    let polls = requests
        .iter()
        .filter(|r| r.path == "/v1beta/operations/op-1")
        .count();
    assert_eq!(polls, 3);

    let download = requests.last().unwrap();
    assert_eq!(download.query, "alt=media&key=paid-key");
}

#[tokio::test]
async fn test_video_without_entitlement_requests_selection_and_proceeds() {
    let (base, _) = serve(|_| Box::new(|_: &Recorded, _: usize| not_found())).await;
    let cache = TempDir::new().unwrap();
    let host = Arc::new(KeySelector::new());
    let c = client(&base, host.clone(), &cache);

    let err = c
        .generate_video("A red fox", AspectRatio::Landscape16x9, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_entitlement_missing());
    assert_eq!(host.selection_requests(), 1);
}

#[tokio::test]
async fn test_finished_job_with_error() {
    let (base, _) = serve(|_| {
        Box::new(|request: &Recorded, _: usize| {
            if request.path.ends_with(":predictLongRunning") {
                return ok(json!({"name": "operations/op-2", "done": false}));
            }
            ok(json!({
                "name": "operations/op-2",
                "done": true,
                "error": {"code": 400, "message": "Prompt rejected", "status": "INVALID_ARGUMENT"}
            }))
        })
    })
    .await;
    let cache = TempDir::new().unwrap();
    let c = client(&base, Arc::new(KeySelector::with_key("paid")), &cache);

    let err = c
        .generate_video("A red fox", AspectRatio::Landscape16x9, &CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        MediaError::Api {
            status, api_status, ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(api_status.as_deref(), Some("INVALID_ARGUMENT"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_finished_job_without_video() {
    let (base, _) = serve(|_| {
        Box::new(|_: &Recorded, _: usize| {
            ok(json!({"name": "operations/op-3", "done": true,
                "response": {"generateVideoResponse": {"generatedSamples": []}}}))
        })
    })
    .await;
    let cache = TempDir::new().unwrap();
    let c = client(&base, Arc::new(KeySelector::with_key("paid")), &cache);

    let result = c
        .generate_video("A red fox", AspectRatio::Landscape16x9, &CancellationToken::new())
        .await;
    assert!(matches!(result, Err(MediaError::VideoFailed)));
}

#[tokio::test]
async fn test_cancel_while_polling() {
    let (base, fake) = serve(|base| video_responder(base, usize::MAX)).await;
    let cache = TempDir::new().unwrap();
    let c = client(&base, Arc::new(KeySelector::with_key("paid")), &cache);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        trigger.cancel();
    });

    let result = c
        .generate_video("A red fox", AspectRatio::Landscape16x9, &cancel)
        .await;
    assert!(matches!(result, Err(MediaError::Cancelled)));

    let polled = fake.polls.load(Ordering::SeqCst);
    assert!(polled >= 1);
    assert!(!fake
        .requests()
        .iter()
        .any(|r| r.path.starts_with("/files/")));
}

// ============================================================================
// Controller over the Gemini client
// ============================================================================

#[tokio::test]
async fn test_video_not_found_requests_key_selection_once() {
    use crate::models::MediaType;
    use crate::repositories::SettingsRepository;
    use crate::services::{FailureKind, HistoryStore, TransitionOutcome, WorkflowController};
    use crate::utils::database::Database;

    let (base, _) = serve(|_| {
        Box::new(|request: &Recorded, _: usize| {
            if request.path.ends_with(":predictLongRunning") {
                return not_found();
            }
            ok(json!({"candidates": [{"content": {"parts": [{"text": "A red fox, golden hour."}]}}]}))
        })
    })
    .await;
    let cache = TempDir::new().unwrap();
    let host = Arc::new(KeySelector::new());
    let history = HistoryStore::new(SettingsRepository::new(Database::in_memory().unwrap()));
    let mut controller =
        WorkflowController::new(client(&base, host.clone(), &cache), history, host.clone());
    controller.edit_config(|c| {
        c.concept = "a red fox in snow".to_string();
        c.media_type = MediaType::Video;
    });

    controller.optimize().await;
    assert_eq!(
        controller.generate().await,
        TransitionOutcome::Failed(FailureKind::KeyRequired)
    );
    assert_eq!(host.selection_requests(), 1);
}
