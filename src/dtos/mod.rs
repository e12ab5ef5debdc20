use serde::Serialize;

/// Success payload in `url` mode. The path resolves against the static
/// mount at `/edited_image`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditedUrlResponse {
    pub edited_image_url: String,
}

/// Success payload in `inline` mode: the edited bytes as a PNG data URL,
/// plus the generated filename.
#[derive(Debug, Serialize)]
pub struct EditedInlineResponse {
    pub image: String,
    pub filename: String,
}
