//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response};
use tokio::io::AsyncWrite;
use tower::ServiceExt;

use powerd::actions::{ActionDispatcher, ActionRegistry};
use powerd::config::{Catalog, ServerSettings};
use powerd::devices::DeviceRegistry;
use powerd::events::EventBus;
use powerd::models::AppState;
use powerd::serial::SerialTransport;

pub const CATALOG: &str = r#"{
    "devices": [
        {"name": "lamp", "type": "local", "on": 0, "off": 0, "channel": 3},
        {"name": "gate", "type": "remote", "on": 5, "off": 6},
        {"name": "wash", "type": "dmx", "channel": 12},
        {"name": "fan", "type": "zigbee", "channel": 1}
    ],
    "actions": [
        {"name": "run", "type": "script", "path": "start.sh"},
        {"name": "hook", "type": "webhook", "path": "notify"}
    ]
}"#;

/// Serial stand-in that keeps every byte written to it.
#[derive(Clone, Default)]
pub struct RecordingPort {
    written: Arc<Mutex<Vec<u8>>>,
}

impl RecordingPort {
    pub fn text(&self) -> String {
        String::from_utf8(self.written.lock().unwrap().clone()).unwrap()
    }
}

impl AsyncWrite for RecordingPort {
    fn poll_write(
        self: Pin<&mut Self>,
        _: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        self.written.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        _: &mut Context<'_>,
    ) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Serial stand-in whose writes always fail.
pub struct BrokenPort;

impl AsyncWrite for BrokenPort {
    fn poll_write(
        self: Pin<&mut Self>,
        _: &mut Context<'_>,
        _: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
    }

    fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        _: &mut Context<'_>,
    ) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
}

pub fn server_settings() -> ServerSettings {
    ServerSettings {
        address: "127.0.0.1:0".to_string(),
        static_dir: PathBuf::from("views"),
    }
}

pub fn app_with(serial: SerialTransport, scripts_dir: &Path) -> TestApp {
    let catalog = Catalog::from_json(CATALOG).unwrap();
    let state = Arc::new(AppState::new(
        DeviceRegistry::from_records(&catalog.devices),
        ActionRegistry::from_records(&catalog.actions),
        serial,
        ActionDispatcher::new(scripts_dir, Arc::new(EventBus::new())),
    ));
    let router = powerd::build_router(Arc::clone(&state), &server_settings());
    TestApp { router, state }
}

pub fn recording_app() -> (TestApp, RecordingPort) {
    let port = RecordingPort::default();
    let app = app_with(
        SerialTransport::from_writer("recording", port.clone()),
        Path::new("scripts"),
    );
    (app, port)
}

pub async fn send(app: &TestApp, method: &str, uri: &str) -> Response<Body> {
    app.router
        .clone()
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
