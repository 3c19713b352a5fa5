//! Integration tests for case endpoints.

use http::StatusCode;
use serde_json::json;

use casehub_core::types::UserId;

use crate::helpers::{Form, TestApp, dicom_bytes};

#[tokio::test]
async fn test_create_and_get_case() {
    let app = TestApp::new().await;
    let user = UserId::new();
    let case_id = app.create_case(user, "P-200").await;

    let response = app
        .request("GET", &format!("/api/v1/cases/{case_id}"), None, Some(user))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let case = &response.body["data"];
    assert_eq!(case["id"], case_id.as_str());
    assert_eq!(case["user"], user.to_string());
    assert_eq!(case["patientId"], "P-200");
    assert_eq!(case["files"].as_array().map(Vec::len), Some(0));
    assert!(case["folderName"].is_null());
}

#[tokio::test]
async fn test_create_case_validation() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/v1/cases",
            Some(json!({
                "firstName": "",
                "lastName": "Doe",
                "patientId": "P-201",
                "gender": "male",
                "birthDate": "1990-01-01"
            })),
            Some(UserId::new()),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_case_duplicate_patient_id() {
    let app = TestApp::new().await;
    let user = UserId::new();
    app.create_case(user, "P-202").await;

    let response = app
        .request(
            "POST",
            "/api/v1/cases",
            Some(json!({
                "firstName": "John",
                "lastName": "Roe",
                "patientId": "P-202",
                "gender": "male",
                "birthDate": "1975-07-19"
            })),
            Some(user),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_case_of_other_user_not_found() {
    let app = TestApp::new().await;
    let case_id = app.create_case(UserId::new(), "P-203").await;

    let response = app
        .request(
            "GET",
            &format!("/api/v1/cases/{case_id}"),
            None,
            Some(UserId::new()),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_directly_into_case() {
    let app = TestApp::new().await;
    let user = UserId::new();
    let case_id = app.create_case(user, "P-204").await;
    let form = Form::new()
        .file_at("ct/axial/slice1.dcm", &dicom_bytes(256))
        .file("DICOMDIR", b"index without preamble");

    let response = app
        .multipart(
            "PUT",
            &format!("/api/v1/cases/{case_id}/files"),
            form,
            Some(user),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let case = &response.body["data"];
    let folder = case["folderName"].as_str().expect("folder name");
    let files = case["files"].as_array().expect("files");
    assert_eq!(files.len(), 2);
    for file in files {
        let path = file["path"].as_str().expect("path");
        assert!(path.starts_with(&format!("{folder}/")), "{path}");
        assert!(app.exists(path));
    }
    assert_eq!(response.body["applied"][0]["placement"]["kind"], "in_place");
    assert!(case["folderStructure"]["ct"]["folders"]["axial"].is_object());
    assert!(!app.exists("_staging"));
}

#[tokio::test]
async fn test_upload_into_case_rejects_invalid_batch() {
    let app = TestApp::new().await;
    let user = UserId::new();
    let case_id = app.create_case(user, "P-205").await;
    let form = Form::new()
        .file("scan.dcm", &dicom_bytes(256))
        .file("photo.jpg", b"\xFF\xD8\xFF\xE0 not dicom");

    let response = app
        .multipart(
            "PUT",
            &format!("/api/v1/cases/{case_id}/files"),
            form,
            Some(user),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.file_count(), 0);

    let case = app
        .request("GET", &format!("/api/v1/cases/{case_id}"), None, Some(user))
        .await;
    assert_eq!(case.body["data"]["files"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_delete_case_removes_folder() {
    let app = TestApp::new().await;
    let user = UserId::new();
    let case_id = app.create_case(user, "P-206").await;
    let uploaded = app
        .multipart(
            "PUT",
            &format!("/api/v1/cases/{case_id}/files"),
            Form::new().file("scan.dcm", &dicom_bytes(256)),
            Some(user),
        )
        .await;
    let folder = uploaded.body["data"]["folderName"]
        .as_str()
        .expect("folder name")
        .to_string();
    assert!(app.exists(&folder));

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/cases/{case_id}"),
            None,
            Some(user),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!app.exists(&folder));

    let response = app
        .request("GET", &format!("/api/v1/cases/{case_id}"), None, Some(user))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
