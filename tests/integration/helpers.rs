//! Shared test helpers for integration tests.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use casehub_api::{build_router, build_state};
use casehub_core::config::{
    AppConfig, DatabaseConfig, LoggingConfig, ServerConfig, StorageConfig,
};
use casehub_core::types::UserId;
use casehub_database::MemoryCaseRepository;
use casehub_storage::LocalStorageProvider;

const BOUNDARY: &str = "casehub-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Storage root; removed when the app is dropped
    pub dir: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application backed by memory and a temp directory
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path().to_string_lossy().into_owned();

        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "memory".to_string(),
                max_connections: 1,
                min_connections: 0,
                connect_timeout_seconds: 1,
                idle_timeout_seconds: 1,
            },
            storage: StorageConfig {
                root_path: root.clone(),
                ..StorageConfig::default()
            },
            logging: LoggingConfig::default(),
        };

        let storage = LocalStorageProvider::new(&root)
            .await
            .expect("Failed to init storage");
        let state = build_state(
            config,
            Arc::new(MemoryCaseRepository::new()),
            None,
            Arc::new(storage),
        );

        Self {
            router: build_router(state),
            dir,
        }
    }

    /// Send a JSON request
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<UserId>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(user) = user {
            req = req.header("X-User-Id", user.to_string());
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a multipart form
    pub async fn multipart(
        &self,
        method: &str,
        path: &str,
        form: Form,
        user: Option<UserId>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );

        if let Some(user) = user {
            req = req.header("X-User-Id", user.to_string());
        }

        let req = req
            .body(Body::from(form.finish()))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Create a case owned by `user` and return its id
    pub async fn create_case(&self, user: UserId, patient_id: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/v1/cases",
                Some(serde_json::json!({
                    "firstName": "Jane",
                    "lastName": "Doe",
                    "patientId": patient_id,
                    "gender": "female",
                    "birthDate": "1980-04-02"
                })),
                Some(user),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"]["id"]
            .as_str()
            .expect("case id")
            .to_string()
    }

    /// Whether `relative` exists under the storage root
    pub fn exists(&self, relative: &str) -> bool {
        self.dir.path().join(relative).exists()
    }

    /// Number of regular files under the storage root
    pub fn file_count(&self) -> usize {
        count_files(self.dir.path())
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Parsed test response
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Builder for a `multipart/form-data` body.
#[derive(Default)]
pub struct Form {
    body: Vec<u8>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loose file with no client-side folder.
    pub fn file(mut self, file_name: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{file_name}\"\r\nContent-Type: application/dicom\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// A file picked from a directory, with its side-channel path fields.
    pub fn file_at(self, relative_path: &str, data: &[u8]) -> Self {
        let (folder, file_name) = relative_path
            .rsplit_once('/')
            .unwrap_or(("", relative_path));
        let mut form = self
            .file(file_name, data)
            .text(&format!("relativePath_{file_name}"), relative_path);
        if !folder.is_empty() {
            form = form.text(&format!("folderPath_{file_name}"), folder);
        }
        form
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// Bytes with a valid DICOM preamble and magic, padded to `len`.
pub fn dicom_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; 128];
    data.extend_from_slice(b"DICM");
    data.resize(len.max(132), 0x42);
    data
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| {
                    let path = entry.path();
                    if path.is_dir() {
                        count_files(&path)
                    } else {
                        1
                    }
                })
                .sum()
        })
        .unwrap_or(0)
}
