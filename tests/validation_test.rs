mod common;

use axum::http::StatusCode;
use common::{edit_form, png_bytes, TestApp};
use image_edit_service::config::ResponseMode;
use image_edit_service::services::editor::mock::MockImageEditor;
use reqwest::multipart;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn spawn_with_double() -> TestApp {
    let editor = Arc::new(MockImageEditor::succeeding(b"edited".to_vec()));
    TestApp::spawn_with_editor(editor, ResponseMode::Url).await
}

async fn error_of(response: reqwest::Response) -> (StatusCode, String) {
    let status = response.status();
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    (status, body["error"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn empty_prompt_is_rejected() {
    let app = spawn_with_double().await;

    for prompt in ["", "   ", " \n\t "] {
        let response = app.post_edit(edit_form(prompt, png_bytes())).await;
        let (status, error) = error_of(response).await;

        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!("Please share a short instruction for your edit.", error);
    }

    assert!(app.uploaded_files().is_empty());
    assert!(app.edited_files().is_empty());
    app.cleanup().await;
}

#[tokio::test]
async fn missing_prompt_field_is_rejected() {
    let app = spawn_with_double().await;

    let form = multipart::Form::new().part(
        "image",
        multipart::Part::bytes(png_bytes())
            .file_name("photo.png")
            .mime_str("image/png")
            .unwrap(),
    );
    let (status, error) = error_of(app.post_edit(form).await).await;

    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert_eq!("Please share a short instruction for your edit.", error);

    app.cleanup().await;
}

#[tokio::test]
async fn missing_image_part_is_rejected() {
    let app = spawn_with_double().await;

    let form = multipart::Form::new().text("prompt", "make it pop");
    let (status, error) = error_of(app.post_edit(form).await).await;

    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert_eq!("Please add an image to edit.", error);

    app.cleanup().await;
}

#[tokio::test]
async fn image_part_without_filename_is_rejected() {
    let app = spawn_with_double().await;

    let form = multipart::Form::new().text("prompt", "make it pop").part(
        "image",
        multipart::Part::bytes(png_bytes()).mime_str("image/png").unwrap(),
    );
    let (status, error) = error_of(app.post_edit(form).await).await;

    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert_eq!("Please add an image to edit.", error);

    app.cleanup().await;
}

#[tokio::test]
async fn non_image_content_type_is_rejected() {
    let app = spawn_with_double().await;

    let form = multipart::Form::new().text("prompt", "make it pop").part(
        "image",
        multipart::Part::bytes(b"hello world".to_vec())
            .file_name("notes.txt")
            .mime_str("text/plain")
            .unwrap(),
    );
    let (status, error) = error_of(app.post_edit(form).await).await;

    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert_eq!("Please upload a valid image file.", error);
    assert!(app.uploaded_files().is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn empty_image_bytes_are_rejected() {
    let app = spawn_with_double().await;

    let form = multipart::Form::new().text("prompt", "make it pop").part(
        "image",
        multipart::Part::bytes(Vec::new())
            .file_name("photo.png")
            .mime_str("image/png")
            .unwrap(),
    );
    let (status, error) = error_of(app.post_edit(form).await).await;

    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert_eq!(
        "We couldn't read that image. Try again with a different file.",
        error
    );

    app.cleanup().await;
}

#[tokio::test]
async fn validation_failures_never_reach_the_upstream() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/edits"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    let app = TestApp::spawn(&mock_server.uri(), ResponseMode::Url).await;

    let response = app.post_edit(edit_form("   ", png_bytes())).await;
    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    let response = app
        .post_edit(multipart::Form::new().text("prompt", "make it pop"))
        .await;
    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    app.cleanup().await;
}
