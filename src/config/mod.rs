use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub editor: EditorConfig,
    pub response_mode: ResponseMode,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub edited_dir: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct EditorConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    pub model: String,
}

/// Shape of the success payload for `/api/edit-image`: a path under the
/// static mount, or the edited bytes inlined as a data URL.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    Url,
    Inline,
}

impl std::str::FromStr for ResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "url" => Ok(ResponseMode::Url),
            "inline" => Ok(ResponseMode::Inline),
            _ => Err(format!("Invalid response mode: {}", s)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("IMAGE_EDIT_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("IMAGE_EDIT_SERVICE_PORT")
            .unwrap_or_else(|_| "3006".to_string())
            .parse()?;

        let upload_dir =
            env::var("IMAGE_EDIT_UPLOAD_DIR").unwrap_or_else(|_| "uploaded_image".to_string());
        let edited_dir =
            env::var("IMAGE_EDIT_EDITED_DIR").unwrap_or_else(|_| "edited_image".to_string());

        let response_mode = env::var("IMAGE_EDIT_RESPONSE_MODE")
            .unwrap_or_else(|_| "url".to_string())
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        // An unset key is allowed at startup; edit calls will fail until it is set.
        let api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        let api_base =
            env::var("OPENAI_API_BASE").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model =
            env::var("IMAGE_EDIT_MODEL").unwrap_or_else(|_| "gpt-image-1-mini".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            storage: StorageConfig {
                upload_dir,
                edited_dir,
            },
            editor: EditorConfig {
                api_key: Secret::new(api_key),
                api_base,
                model,
            },
            response_mode,
        })
    }
}
