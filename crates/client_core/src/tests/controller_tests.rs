use std::{
    collections::VecDeque,
    sync::{Arc, Mutex as StdMutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::json;
use shared::{
    domain::{Screen, Theme},
    error::ValidationError,
};
use tokio::{net::TcpListener, sync::Notify};

use super::*;
use crate::{
    context::{Navigator, Redirect, RenderSink},
    preferences::{MemoryPreferenceStore, PreferenceStore},
    transport::HttpTransport,
};

type Log = Arc<StdMutex<Vec<String>>>;

#[derive(Default)]
struct RecordingSink {
    log: Log,
    models: StdMutex<Vec<DisplayModel>>,
    themes: StdMutex<Vec<Theme>>,
}

impl RecordingSink {
    fn with_log(log: Log) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    fn models(&self) -> Vec<DisplayModel> {
        self.models.lock().expect("models").clone()
    }

    fn last(&self) -> DisplayModel {
        self.models().last().cloned().expect("at least one render")
    }
}

impl RenderSink for RecordingSink {
    fn render(&self, model: &DisplayModel) {
        let entry = if model.is_pending() {
            "render:pending".to_string()
        } else if let Some(message) = &model.message {
            format!("render:{:?}:{}", message.tone, message.text())
        } else {
            "render:idle".to_string()
        };
        self.log.lock().expect("log").push(entry);
        self.models.lock().expect("models").push(model.clone());
    }

    fn apply_theme(&self, theme: Theme) {
        self.themes.lock().expect("themes").push(theme);
    }
}

#[derive(Default)]
struct RecordingNavigator {
    redirects: StdMutex<Vec<Redirect>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, redirect: Redirect) {
        self.redirects.lock().expect("redirects").push(redirect);
    }
}

#[derive(Clone, Default)]
struct ScriptedTransport {
    log: Log,
    calls: Arc<StdMutex<Vec<(String, Value)>>>,
    replies: Arc<StdMutex<VecDeque<Result<RawResponse, TransportError>>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedTransport {
    fn replying(log: Log, replies: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self {
            log,
            replies: Arc::new(StdMutex::new(replies.into())),
            ..Self::default()
        }
    }

    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn call_count(&self) -> usize {
        self.calls.lock().expect("calls").len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, path: &str, body: &Value) -> Result<RawResponse, TransportError> {
        self.log.lock().expect("log").push(format!("request:{path}"));
        self.calls
            .lock()
            .expect("calls")
            .push((path.to_string(), body.clone()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .expect("replies")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted reply")))
    }
}

fn reply(status: u16, body: Value) -> Result<RawResponse, TransportError> {
    Ok(RawResponse {
        status,
        body: serde_json::to_vec(&body).expect("encode"),
    })
}

struct Harness {
    log: Log,
    sink: Arc<RecordingSink>,
    navigator: Arc<RecordingNavigator>,
    preferences: Arc<MemoryPreferenceStore>,
}

impl Harness {
    fn new() -> Self {
        let log: Log = Arc::default();
        Self {
            sink: Arc::new(RecordingSink::with_log(log.clone())),
            log,
            navigator: Arc::default(),
            preferences: Arc::default(),
        }
    }

    fn context(&self) -> ScreenContext {
        ScreenContext::new(
            self.sink.clone(),
            self.navigator.clone(),
            self.preferences.clone(),
        )
    }

    fn mount<T: Transport>(&self, flow: Flow, transport: T) -> ExchangeController<T> {
        ExchangeController::mount(
            Presentation::for_flow(flow),
            transport,
            self.context(),
            ValidationRules::default(),
        )
        .expect("mount")
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().expect("log").clone()
    }

    fn redirects(&self) -> Vec<Redirect> {
        self.navigator.redirects.lock().expect("redirects").clone()
    }
}

fn chat(message: &str) -> RawInput {
    RawInput::Chat {
        message: message.to_string(),
    }
}

#[tokio::test]
async fn chat_exchange_renders_pending_then_reply() {
    let harness = Harness::new();
    let transport = ScriptedTransport::replying(
        harness.log.clone(),
        vec![reply(200, json!({"resposta": "hi\nthere"}))],
    );
    let controller = harness.mount(Flow::Chat, transport.clone());

    let submission = controller.submit(chat("hello")).await;

    let terminal = submission.terminal().expect("resolved");
    assert!(matches!(terminal, ExchangeState::Succeeded(_)));
    assert!(controller.state().await.is_idle());
    assert_eq!(
        harness.log(),
        vec![
            "render:Success:Hi! I'm TekBot and I'm here to help you!",
            "render:pending",
            "request:/ia/responder",
            "render:Success:hi\nthere",
        ]
    );

    let last = harness.sink.last();
    assert!(!last.is_pending());
    assert_eq!(last.message.expect("message").lines, vec!["hi", "there"]);
    assert_eq!(
        transport.calls.lock().expect("calls")[0],
        ("/ia/responder".to_string(), json!({"pergunta": "hello"}))
    );
}

#[tokio::test]
async fn password_mismatch_never_reaches_transport() {
    let harness = Harness::new();
    let transport = ScriptedTransport::replying(harness.log.clone(), Vec::new());
    let controller = harness.mount(Flow::ResetPassword, transport.clone());

    let submission = controller
        .submit(RawInput::ResetPassword {
            password: "abcdefg".into(),
            confirmation: "xyzxyzx".into(),
            token: Some("tok".into()),
        })
        .await;

    assert_eq!(
        submission,
        Submission::Resolved(ExchangeState::Failed(ExchangeError::Validation(
            ValidationError::PasswordMismatch
        )))
    );
    assert_eq!(transport.call_count(), 0);
    assert!(controller.state().await.is_idle());
    assert!(harness.log().iter().all(|entry| entry != "render:pending"));
    assert_eq!(harness.sink.last().message.expect("message").tone, Tone::Error);
}

#[tokio::test]
async fn short_mismatched_password_is_a_validation_error() {
    let harness = Harness::new();
    let transport = ScriptedTransport::replying(harness.log.clone(), Vec::new());
    let controller = harness.mount(Flow::Register, transport.clone());

    let submission = controller
        .submit(RawInput::Register {
            email: "user@example.com".into(),
            password: "abc".into(),
            confirmation: "xyz".into(),
        })
        .await;

    match submission.terminal() {
        Some(ExchangeState::Failed(err)) => assert!(err.is_validation()),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn second_submit_while_pending_is_ignored() {
    let harness = Harness::new();
    let gate = Arc::new(Notify::new());
    let transport = ScriptedTransport::replying(
        harness.log.clone(),
        vec![reply(200, json!({"resposta": "first"}))],
    )
    .gated(gate.clone());
    let controller = Arc::new(harness.mount(Flow::Chat, transport.clone()));

    let in_flight = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit(chat("hello")).await })
    };

    for _ in 0..200 {
        if transport.call_count() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(controller.state().await.is_pending());
    let renders_before = harness.sink.models().len();

    assert_eq!(controller.submit(chat("again")).await, Submission::Ignored);
    assert_eq!(controller.submit(chat("   ")).await, Submission::Ignored);

    assert!(controller.state().await.is_pending());
    assert_eq!(transport.call_count(), 1);
    assert_eq!(harness.sink.models().len(), renders_before);

    gate.notify_one();
    let first = in_flight.await.expect("join");
    assert!(matches!(first.terminal(), Some(ExchangeState::Succeeded(_))));
    assert!(controller.state().await.is_idle());
}

#[tokio::test]
async fn server_detail_is_rendered_verbatim() {
    let harness = Harness::new();
    let transport = ScriptedTransport::replying(
        harness.log.clone(),
        vec![reply(400, json!({"detail": "X"}))],
    );
    let controller = harness.mount(Flow::RecoverPassword, transport);

    let submission = controller
        .submit(RawInput::RecoverPassword {
            email: "user@example.com".into(),
        })
        .await;

    assert_eq!(
        submission,
        Submission::Resolved(ExchangeState::Failed(ExchangeError::Server {
            status: 400,
            detail: Some("X".into()),
        }))
    );
    assert_eq!(harness.sink.last().message.expect("message").text(), "X");
}

#[tokio::test]
async fn missing_or_structured_detail_uses_fallback() {
    let harness = Harness::new();
    let transport = ScriptedTransport::replying(
        harness.log.clone(),
        vec![
            reply(500, json!({})),
            reply(422, json!({"detail": [{"loc": ["body", "email"]}]})),
        ],
    );
    let controller = harness.mount(Flow::RecoverPassword, transport);
    let input = RawInput::RecoverPassword {
        email: "user@example.com".into(),
    };

    controller.submit(input.clone()).await;
    assert_eq!(
        harness.sink.last().message.expect("message").text(),
        "Could not send the recovery e-mail."
    );

    controller.submit(input).await;
    assert_eq!(
        harness.sink.last().message.expect("message").text(),
        "Could not send the recovery e-mail."
    );
    assert!(controller.state().await.is_idle());
}

#[tokio::test]
async fn malformed_chat_reply_uses_fallback() {
    let harness = Harness::new();
    let transport = ScriptedTransport::replying(
        harness.log.clone(),
        vec![reply(200, json!({"erro": "unexpected"}))],
    );
    let controller = harness.mount(Flow::Chat, transport);

    let submission = controller.submit(chat("hello")).await;

    assert!(matches!(
        submission.terminal(),
        Some(ExchangeState::Failed(ExchangeError::MalformedResponse { .. }))
    ));
    assert_eq!(
        harness.sink.last().message.expect("message").text(),
        "Could not process the question. Please try again."
    );
}

#[tokio::test]
async fn transport_failure_leaves_controller_usable() {
    let harness = Harness::new();
    let transport = ScriptedTransport::replying(
        harness.log.clone(),
        vec![
            Err(TransportError::new("connection refused")),
            reply(200, json!({"resposta": "back online"})),
        ],
    );
    let controller = harness.mount(Flow::Chat, transport.clone());

    controller.submit(chat("hello")).await;
    let failed = harness.sink.last();
    assert_eq!(
        failed.message.expect("message").text(),
        crate::render::CONNECTION_ERROR
    );
    assert!(controller.state().await.is_idle());

    let retry = controller.submit(chat("hello again")).await;
    assert!(matches!(retry.terminal(), Some(ExchangeState::Succeeded(_))));
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn login_success_redirects_to_chat() {
    let harness = Harness::new();
    let transport = ScriptedTransport::replying(
        harness.log.clone(),
        vec![
            reply(401, json!({"detail": "Invalid credentials"})),
            reply(200, json!({"access_token": "jwt", "token_type": "bearer"})),
        ],
    );
    let controller = harness.mount(Flow::Login, transport);
    let input = RawInput::Login {
        email: " user@example.com ".into(),
        password: "secret".into(),
    };

    controller.submit(input.clone()).await;
    assert!(harness.redirects().is_empty());
    assert_eq!(
        harness.sink.last().message.expect("message").text(),
        "Invalid credentials"
    );

    controller.submit(input).await;
    assert_eq!(
        harness.redirects(),
        vec![Redirect {
            screen: Screen::Chat,
            after: Duration::ZERO,
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn register_success_waits_before_redirecting() {
    let harness = Harness::new();
    let transport = ScriptedTransport::replying(
        harness.log.clone(),
        vec![reply(200, json!({"email": "user@example.com", "senha": "x"}))],
    );
    let controller = harness.mount(Flow::Register, transport);

    let started = tokio::time::Instant::now();
    controller
        .submit(RawInput::Register {
            email: "user@example.com".into(),
            password: "longenough".into(),
            confirmation: "longenough".into(),
        })
        .await;

    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(
        harness.redirects(),
        vec![Redirect {
            screen: Screen::Login,
            after: Duration::from_secs(2),
        }]
    );
    assert_eq!(
        harness.sink.last().message.expect("message").text(),
        "Registration completed successfully!"
    );
}

#[tokio::test]
async fn input_for_another_screen_is_ignored() {
    let harness = Harness::new();
    let transport = ScriptedTransport::replying(harness.log.clone(), Vec::new());
    let controller = harness.mount(Flow::Login, transport.clone());

    assert_eq!(controller.submit(chat("hello")).await, Submission::Ignored);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn mount_applies_saved_theme_and_unmount_returns_context() {
    let harness = Harness::new();
    harness
        .preferences
        .set(Theme::STORAGE_KEY, "escuro")
        .expect("seed theme");
    let transport = ScriptedTransport::replying(harness.log.clone(), Vec::new());
    let controller = harness.mount(Flow::RecoverPassword, transport);

    assert_eq!(*harness.sink.themes.lock().expect("themes"), vec![Theme::Dark]);
    assert_eq!(harness.log(), vec!["render:idle"]);

    let context = controller.unmount();
    assert_eq!(context.toggle_theme().expect("toggle"), Theme::Light);
    assert_eq!(
        harness
            .preferences
            .get(Theme::STORAGE_KEY)
            .expect("read")
            .as_deref(),
        Some("claro")
    );
}

async fn handle_ask(Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body, json!({"pergunta": "hello"}));
    Json(json!({"resposta": "hi\nthere"}))
}

async fn handle_reset() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"detail": "Invalid or expired token"})),
    )
}

async fn spawn_api() -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/ia/responder", post(handle_ask))
        .route("/redefinir-senha", post(handle_reset));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn chat_over_http_end_to_end() {
    let server_url = spawn_api().await.expect("spawn api");
    let harness = Harness::new();
    let controller = harness.mount(
        Flow::Chat,
        HttpTransport::new(&server_url).expect("transport"),
    );

    let submission = controller.submit(chat("hello")).await;

    assert!(matches!(submission.terminal(), Some(ExchangeState::Succeeded(_))));
    let models = harness.sink.models();
    assert!(models.iter().any(DisplayModel::is_pending));
    let last = models.last().cloned().expect("final render");
    assert!(!last.is_pending());
    assert_eq!(last.message.expect("message").html(), "hi<br>there");
    assert!(controller.state().await.is_idle());
}

#[tokio::test]
async fn reset_over_http_surfaces_detail() {
    let server_url = spawn_api().await.expect("spawn api");
    let harness = Harness::new();
    let controller = harness.mount(
        Flow::ResetPassword,
        HttpTransport::new(&server_url).expect("transport"),
    );

    controller
        .submit(RawInput::ResetPassword {
            password: "longenough".into(),
            confirmation: "longenough".into(),
            token: Some("stale".into()),
        })
        .await;

    assert_eq!(
        harness.sink.last().message.expect("message").text(),
        "Invalid or expired token"
    );
    assert!(harness.redirects().is_empty());
}
