//! Integration tests for staging, association, and removal.

use http::StatusCode;
use serde_json::{Value, json};

use casehub_core::types::UserId;

use crate::helpers::{Form, TestApp, dicom_bytes};

async fn stage_study(app: &TestApp, user: UserId) -> Value {
    let form = Form::new()
        .file_at("study/series1/a.dcm", &dicom_bytes(200))
        .file_at("study/series2/b.dcm", &dicom_bytes(300));
    let response = app
        .multipart("POST", "/api/v1/files/upload", form, Some(user))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    response.body
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], "memory");
}

#[tokio::test]
async fn test_upload_unauthenticated() {
    let app = TestApp::new().await;
    let form = Form::new().file("a.dcm", &dicom_bytes(200));

    let response = app
        .multipart("POST", "/api/v1/files/upload", form, None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
    assert_eq!(app.file_count(), 0);
}

#[tokio::test]
async fn test_upload_stages_files_with_folder_tree() {
    let app = TestApp::new().await;
    let body = stage_study(&app, UserId::new()).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);

    let files = body["data"].as_array().expect("data array");
    assert_eq!(files.len(), 2);
    for file in files {
        let path = file["stagingPath"].as_str().expect("staging path");
        assert!(path.starts_with("_staging/upload_"), "{path}");
        assert!(app.exists(path));
    }
    assert_eq!(files[0]["folderPath"], "study/series1");
    assert_eq!(files[0]["relativePath"], "study/series1/a.dcm");

    let study = &body["folderStructure"]["study"];
    assert_eq!(study["folders"]["series1"]["files"][0]["name"], "a.dcm");
    assert_eq!(study["folders"]["series2"]["files"][0]["name"], "b.dcm");
}

#[tokio::test]
async fn test_upload_rejects_whole_batch_on_invalid_file() {
    let app = TestApp::new().await;
    let form = Form::new()
        .file_at("study/good.dcm", &dicom_bytes(200))
        .file_at("study/notes.txt", b"plain text, not an image");

    let response = app
        .multipart("POST", "/api/v1/files/upload", form, Some(UserId::new()))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let message = response.body["message"].as_str().expect("message");
    assert!(message.contains("notes.txt"), "{message}");
    assert!(!message.contains("good.dcm"), "{message}");
    assert_eq!(app.file_count(), 0);
}

#[tokio::test]
async fn test_upload_empty_batch() {
    let app = TestApp::new().await;

    let response = app
        .multipart(
            "POST",
            "/api/v1/files/upload",
            Form::new().text("caseId", ""),
            Some(UserId::new()),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_associate_moves_files_into_case_folder() {
    let app = TestApp::new().await;
    let user = UserId::new();
    let case_id = app.create_case(user, "P-100").await;
    let staged = stage_study(&app, user).await;

    let response = app
        .request(
            "POST",
            &format!("/api/v1/files/associate/{case_id}"),
            Some(json!({
                "files": staged["data"],
                "folderStructure": staged["folderStructure"],
            })),
            Some(user),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let case = &response.body["data"];
    let folder = case["folderName"].as_str().expect("folder name");
    assert!(folder.starts_with(&format!("case_{case_id}_")), "{folder}");

    let files = case["files"].as_array().expect("files");
    assert_eq!(files.len(), 2);
    for file in files {
        let path = file["path"].as_str().expect("path");
        assert!(path.starts_with(&format!("{folder}/study/")), "{path}");
        assert!(app.exists(path));
    }
    assert!(case["folderStructure"]["study"].is_object());
    assert_eq!(response.body["applied"].as_array().map(Vec::len), Some(2));
    assert_eq!(response.body["applied"][0]["placement"]["kind"], "moved");
    assert_eq!(response.body["skipped"].as_array().map(Vec::len), Some(0));

    // Nothing is left behind in staging.
    for file in staged["data"].as_array().expect("staged") {
        assert!(!app.exists(file["stagingPath"].as_str().expect("path")));
    }
    assert_eq!(app.file_count(), 2);
}

#[tokio::test]
async fn test_associate_twice_is_idempotent() {
    let app = TestApp::new().await;
    let user = UserId::new();
    let case_id = app.create_case(user, "P-101").await;
    let staged = stage_study(&app, user).await;
    let body = json!({ "files": staged["data"] });
    let path = format!("/api/v1/files/associate/{case_id}");

    let first = app.request("POST", &path, Some(body.clone()), Some(user)).await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app.request("POST", &path, Some(body), Some(user)).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["data"]["files"].as_array().map(Vec::len), Some(2));
    assert_eq!(second.body["applied"].as_array().map(Vec::len), Some(0));
    assert_eq!(
        second.body["skipped"][0]["reason"]["code"],
        "already_associated"
    );
}

#[tokio::test]
async fn test_associate_other_users_case_forbidden() {
    let app = TestApp::new().await;
    let owner = UserId::new();
    let intruder = UserId::new();
    let case_id = app.create_case(owner, "P-102").await;
    let staged = stage_study(&app, intruder).await;

    let response = app
        .request(
            "POST",
            &format!("/api/v1/files/associate/{case_id}"),
            Some(json!({ "files": staged["data"] })),
            Some(intruder),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_associate_requires_files() {
    let app = TestApp::new().await;
    let user = UserId::new();
    let case_id = app.create_case(user, "P-103").await;

    let response = app
        .request(
            "POST",
            &format!("/api/v1/files/associate/{case_id}"),
            Some(json!({ "files": [] })),
            Some(user),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_remove_file_from_case() {
    let app = TestApp::new().await;
    let user = UserId::new();
    let case_id = app.create_case(user, "P-104").await;
    let staged = stage_study(&app, user).await;
    let associated = app
        .request(
            "POST",
            &format!("/api/v1/files/associate/{case_id}"),
            Some(json!({ "files": staged["data"] })),
            Some(user),
        )
        .await;
    let file = associated.body["data"]["files"][0].clone();
    let file_id = file["id"].as_str().expect("file id");
    let file_path = file["path"].as_str().expect("file path");

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/files/remove/{case_id}/{file_id}"),
            None,
            Some(user),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let files = response.body["data"]["files"].as_array().expect("files");
    assert_eq!(files.len(), 1);
    assert_ne!(files[0]["id"], file["id"]);
    assert!(!app.exists(file_path));
    assert_eq!(app.file_count(), 1);
}

#[tokio::test]
async fn test_remove_unknown_file_not_found() {
    let app = TestApp::new().await;
    let user = UserId::new();
    let case_id = app.create_case(user, "P-105").await;

    let response = app
        .request(
            "DELETE",
            &format!(
                "/api/v1/files/remove/{case_id}/{}",
                uuid::Uuid::new_v4()
            ),
            None,
            Some(user),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
