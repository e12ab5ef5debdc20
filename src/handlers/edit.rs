use crate::config::ResponseMode;
use crate::dtos::{EditedInlineResponse, EditedUrlResponse};
use crate::error::AppError;
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use metrics::counter;
use std::path::Path;

/// Raw multipart fields of an edit request, before validation.
#[derive(Default)]
struct EditForm {
    prompt: Option<String>,
    image_bytes: Option<Vec<u8>>,
    image_filename: Option<String>,
    image_content_type: Option<String>,
}

/// Accepts an image plus a text instruction, forwards both to the editor,
/// and persists the upload and the edited result.
pub async fn edit_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_form(multipart).await?;

    validate_image(
        form.image_filename.as_deref(),
        form.image_content_type.as_deref(),
    )?;
    let prompt = validate_prompt(form.prompt.as_deref().unwrap_or_default())?;

    let image_bytes = form.image_bytes.unwrap_or_default();
    if image_bytes.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "We couldn't read that image. Try again with a different file."
        )));
    }

    let extension = form
        .image_filename
        .as_deref()
        .and_then(|name| Path::new(name).extension().and_then(|e| e.to_str()))
        .unwrap_or("png");

    let upload = state.store.save_upload(&image_bytes, extension).await?;
    tracing::info!(
        upload = %upload.name,
        size = image_bytes.len(),
        "Upload saved"
    );

    let edited_bytes = state
        .editor
        .edit_image(&upload.path, &prompt)
        .await
        .map_err(|e| {
            tracing::error!(upload = %upload.name, error = %e, "Image edit failed");
            AppError::EditFailed(anyhow::Error::new(e))
        })?;

    let edited = state.store.save_edited(&edited_bytes).await?;
    counter!("image_edits_total").increment(1);
    tracing::info!(
        upload = %upload.name,
        edited = %edited.name,
        "Image edit completed"
    );

    Ok(match state.config.response_mode {
        ResponseMode::Url => Json(EditedUrlResponse {
            edited_image_url: format!("/edited_image/{}", edited.name),
        })
        .into_response(),
        ResponseMode::Inline => Json(EditedInlineResponse {
            image: format!(
                "data:image/png;base64,{}",
                general_purpose::STANDARD.encode(&edited_bytes)
            ),
            filename: edited.name,
        })
        .into_response(),
    })
}

async fn read_form(mut multipart: Multipart) -> Result<EditForm, AppError> {
    let mut form = EditForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "prompt" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read prompt field: {}", e))
                })?;
                form.prompt = Some(text);
            }
            "image" => {
                form.image_filename = field.file_name().map(|s| s.to_string());
                form.image_content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read image field: {}", e))
                })?;
                form.image_bytes = Some(data.to_vec());
            }
            // Unknown fields are ignored.
            _ => {}
        }
    }

    Ok(form)
}

fn validate_prompt(prompt: &str) -> Result<String, AppError> {
    let cleaned = prompt.trim();
    if cleaned.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Please share a short instruction for your edit."
        )));
    }
    Ok(cleaned.to_string())
}

fn validate_image(filename: Option<&str>, content_type: Option<&str>) -> Result<(), AppError> {
    if filename.map_or(true, |name| name.is_empty()) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Please add an image to edit."
        )));
    }

    // A missing content type is accepted; a declared non-image one is not.
    if let Some(content_type) = content_type {
        if !content_type.starts_with("image") {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Please upload a valid image file."
            )));
        }
    }

    Ok(())
}
