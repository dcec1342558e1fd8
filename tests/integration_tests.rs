//! Integration tests for the TrashLens upload-and-classify workflow.
//!
//! These drive the application the way the webview does — raw IPC messages
//! into `app::handle_ipc_message` — with the real HTTP classifier pointed at
//! a loopback stub server, and use an async-aware MPSC channel from
//! `tokio::sync` to observe the events sent back to the UI.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use trashlens::app::{self, events::UserEvent, proxy::EventProxy, state::UploadState};
use trashlens::app::file_dialog::DialogService;
use trashlens::app::view_model::UiState;
use trashlens::config::AppConfig;

/// Contains the test infrastructure.
mod helpers {
    use super::*;
    use std::fs;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// A test double for the `EventLoopProxy` using a tokio MPSC channel.
    #[derive(Clone)]
    pub struct TestEventProxy {
        pub sender: mpsc::UnboundedSender<UserEvent>,
    }

    impl EventProxy for TestEventProxy {
        fn send_event(&self, event: UserEvent) {
            // Late events from superseded tasks may outlive the receiver.
            let _ = self.sender.send(event);
        }
    }

    /// A mock dialog that "picks" a preconfigured path.
    pub struct MockDialogService {
        pub picked: Mutex<Option<PathBuf>>,
    }

    impl DialogService for MockDialogService {
        fn pick_image(&self, _config: &AppConfig) -> Option<PathBuf> {
            self.picked.lock().unwrap().clone()
        }
    }

    /// `TestHarness` sets up a complete, isolated environment for each test case.
    pub struct TestHarness {
        pub state: Arc<Mutex<UploadState>>,
        pub proxy: TestEventProxy,
        pub event_rx: mpsc::UnboundedReceiver<UserEvent>,
        pub dialog: Arc<MockDialogService>,
        pub root_path: PathBuf,
        _temp_dir: TempDir,
    }

    impl TestHarness {
        /// Creates a new test harness pointed at the given classifier base URL.
        pub fn new(base_url: String) -> Self {
            let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
            let root_path = temp_dir.path().to_path_buf();
            let (event_tx, event_rx) = mpsc::unbounded_channel();

            let config = AppConfig {
                base_url,
                ..Default::default()
            };
            let mut state = UploadState::with_config(config);
            state.config_dir_override = Some(root_path.clone());

            Self {
                state: Arc::new(Mutex::new(state)),
                proxy: TestEventProxy { sender: event_tx },
                event_rx,
                dialog: Arc::new(MockDialogService {
                    picked: Mutex::new(None),
                }),
                root_path,
                _temp_dir: temp_dir,
            }
        }

        /// Creates a file inside the temporary test directory.
        pub fn create_file(&self, name: &str, bytes: &[u8]) -> PathBuf {
            let path = self.root_path.join(name);
            fs::write(&path, bytes).expect("Failed to write file");
            path
        }

        pub fn create_image(&self, name: &str) -> PathBuf {
            self.create_file(name, b"\xff\xd8\xff\xe0 fake image bytes")
        }

        /// Sends a raw IPC message, exactly as the webview would.
        pub fn send_ipc(&self, command: &str, payload: serde_json::Value) {
            let message = serde_json::json!({ "command": command, "payload": payload });
            app::handle_ipc_message(
                message.to_string(),
                self.dialog.clone(),
                self.proxy.clone(),
                self.state.clone(),
            );
        }

        /// Receives state updates until one carries the wanted phase tag.
        pub async fn wait_for_phase(&mut self, phase: &str) -> Box<UiState> {
            loop {
                match tokio::time::timeout(Duration::from_secs(5), self.event_rx.recv()).await {
                    Ok(Some(UserEvent::StateUpdate(ui_state))) => {
                        if ui_state.phase == phase {
                            return ui_state;
                        }
                    }
                    Ok(Some(_)) => { /* Ignore other events */ }
                    _ => panic!("Timed out waiting for phase '{phase}' or channel closed"),
                }
            }
        }

        pub async fn next_event(&mut self) -> Option<UserEvent> {
            tokio::time::timeout(Duration::from_millis(300), self.event_rx.recv())
                .await
                .ok()
                .flatten()
        }
    }

    fn request_complete(buf: &[u8]) -> bool {
        buf.ends_with(b"--\r\n") || buf.ends_with(b"0\r\n\r\n")
    }

    /// Serves exactly one HTTP request on a loopback port with a canned JSON
    /// body, returning the base URL to configure the client with.
    pub async fn serve_once(status_line: &str, body: &str) -> String {
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                loop {
                    match tokio::time::timeout(Duration::from_millis(250), stream.read(&mut chunk))
                        .await
                    {
                        Ok(Ok(0)) => break,
                        Ok(Ok(n)) => {
                            buf.extend_from_slice(&chunk[..n]);
                            if request_complete(&buf) {
                                break;
                            }
                        }
                        _ => break,
                    }
                }
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    /// A port nothing listens on.
    pub async fn dead_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }
}

#[tokio::test]
async fn a_dropped_image_ends_up_classified() {
    let body = r#"{"success":true,"class":"plastic","confidence":0.87,"probabilities":{"plastic":0.87,"trash":0.05,"glass":0.08}}"#;
    let base_url = helpers::serve_once("200 OK", body).await;
    let mut harness = helpers::TestHarness::new(base_url);
    let image = harness.create_image("bottle.jpg");

    harness.send_ipc("submitFile", serde_json::json!(image));

    let preview_state = harness.wait_for_phase("preview_ready").await;
    assert!(preview_state.preview.is_some());

    harness.wait_for_phase("classifying").await;

    let final_state = harness.wait_for_phase("succeeded").await;
    let result = final_state.result.expect("Expected a classification result");
    assert_eq!(result.label, "plastic");
    assert_eq!(result.display_name, "Plastic");
    assert_eq!(result.confidence_percent, "87.0%");
    assert_eq!(result.probabilities.len(), 3);
    assert_eq!(result.probabilities[0].label, "plastic");
}

#[tokio::test]
async fn a_server_error_surfaces_as_a_failed_state() {
    let base_url = helpers::serve_once(
        "500 Internal Server Error",
        r#"{"detail":"Classification failed: model exploded"}"#,
    )
    .await;
    let mut harness = helpers::TestHarness::new(base_url);
    let image = harness.create_image("bottle.jpg");

    harness.send_ipc("submitFile", serde_json::json!(image));

    let final_state = harness.wait_for_phase("failed").await;
    let message = final_state.error_message.unwrap();
    assert!(message.contains("500"));
    assert!(message.contains("model exploded"));
    assert!(
        final_state.preview.is_some(),
        "A remote failure keeps the preview on screen"
    );
}

#[tokio::test]
async fn an_unreachable_backend_names_its_address() {
    let base_url = helpers::dead_endpoint().await;
    let mut harness = helpers::TestHarness::new(base_url.clone());
    let image = harness.create_image("bottle.jpg");

    harness.send_ipc("submitFile", serde_json::json!(image));

    let final_state = harness.wait_for_phase("failed").await;
    let message = final_state.error_message.unwrap();
    assert!(
        message.contains(&format!("{base_url}/classify")),
        "Message should name the endpoint, got: {message}"
    );
}

#[tokio::test]
async fn validation_failures_never_touch_the_network() {
    // The dead endpoint would fail differently; validation must fail first.
    let base_url = helpers::dead_endpoint().await;
    let mut harness = helpers::TestHarness::new(base_url);
    let not_an_image = harness.create_file("notes.txt", b"plain text");

    harness.send_ipc("submitFile", serde_json::json!(not_an_image));

    let final_state = harness.wait_for_phase("failed").await;
    let message = final_state.error_message.unwrap();
    assert!(message.contains("notes.txt"));
    assert!(
        !message.contains("classify"),
        "A local rejection must not mention the endpoint: {message}"
    );
    assert!(final_state.preview.is_none());
}

#[tokio::test]
async fn picking_an_image_submits_it_and_remembers_the_directory() {
    let body = r#"{"success":true,"class":"metal","confidence":0.93,"probabilities":{}}"#;
    let base_url = helpers::serve_once("200 OK", body).await;
    let mut harness = helpers::TestHarness::new(base_url);
    let image = harness.create_image("can.png");
    *harness.dialog.picked.lock().unwrap() = Some(image);

    harness.send_ipc("pickImage", serde_json::Value::Null);

    let final_state = harness.wait_for_phase("succeeded").await;
    let result = final_state.result.unwrap();
    assert_eq!(result.label, "metal");
    assert!(
        result.probabilities.is_empty(),
        "An empty probability map is 'no detail available', not an error"
    );

    let state = harness.state.lock().unwrap();
    assert_eq!(
        state.config.last_image_directory.as_deref(),
        Some(harness.root_path.as_path())
    );
    assert!(
        harness.root_path.join("config.json").exists(),
        "The remembered directory must be persisted inside the harness dir"
    );
}

#[tokio::test]
async fn a_cancelled_pick_does_nothing() {
    let mut harness = helpers::TestHarness::new(helpers::dead_endpoint().await);

    harness.send_ipc("pickImage", serde_json::Value::Null);

    assert!(harness.next_event().await.is_none());
}

#[tokio::test]
async fn reset_after_a_failure_returns_to_idle() {
    let base_url = helpers::dead_endpoint().await;
    let mut harness = helpers::TestHarness::new(base_url);
    let image = harness.create_image("bottle.jpg");

    harness.send_ipc("submitFile", serde_json::json!(image));
    harness.wait_for_phase("failed").await;

    harness.send_ipc("reset", serde_json::Value::Null);

    let idle_state = harness.wait_for_phase("idle").await;
    assert!(idle_state.preview.is_none());
    assert!(idle_state.result.is_none());
    assert!(idle_state.error_message.is_none());
}

#[tokio::test]
async fn initialize_pushes_the_idle_state_to_a_fresh_session() {
    let mut harness = helpers::TestHarness::new("http://localhost:8000".to_string());

    harness.send_ipc("initialize", serde_json::Value::Null);

    let idle_state = harness.wait_for_phase("idle").await;
    assert!(!idle_state.is_classifying);
    assert_eq!(idle_state.config.base_url, "http://localhost:8000");
}

#[tokio::test]
async fn unknown_commands_and_garbage_messages_are_ignored() {
    let mut harness = helpers::TestHarness::new("http://localhost:8000".to_string());

    harness.send_ipc("doSomethingElse", serde_json::Value::Null);
    app::handle_ipc_message(
        "not even json".to_string(),
        harness.dialog.clone(),
        harness.proxy.clone(),
        harness.state.clone(),
    );

    assert!(harness.next_event().await.is_none());
}
