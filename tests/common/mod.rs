use image_edit_service::config::{
    Config, EditorConfig, ResponseMode, ServerConfig, StorageConfig,
};
use image_edit_service::services::editor::ImageEditor;
use image_edit_service::startup::Application;
use reqwest::multipart;
use secrecy::Secret;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_API_KEY: &str = "sk-test";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub storage_root: String,
    pub upload_dir: String,
    pub edited_dir: String,
}

/// Config for one test run: random port, throwaway storage under target/,
/// editor pointed at the given base URL.
pub fn test_config(api_base: &str, response_mode: ResponseMode) -> (Config, String) {
    let storage_root = format!("target/test-storage-{}", Uuid::new_v4());
    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        storage: StorageConfig {
            upload_dir: format!("{}/uploaded_image", storage_root),
            edited_dir: format!("{}/edited_image", storage_root),
        },
        editor: EditorConfig {
            api_key: Secret::new(TEST_API_KEY.to_string()),
            api_base: api_base.to_string(),
            model: "gpt-image-1-mini".to_string(),
        },
        response_mode,
    };
    (config, storage_root)
}

impl TestApp {
    /// Spawn with the real OpenAI-backed editor; `api_base` normally points
    /// at a MockServer.
    pub async fn spawn(api_base: &str, response_mode: ResponseMode) -> Self {
        let (config, storage_root) = test_config(api_base, response_mode);
        let app = Application::build(config.clone())
            .await
            .expect("Failed to build test application");
        Self::start(app, config, storage_root).await
    }

    /// Spawn with an injected editor double.
    pub async fn spawn_with_editor(
        editor: Arc<dyn ImageEditor>,
        response_mode: ResponseMode,
    ) -> Self {
        let (config, storage_root) = test_config("http://127.0.0.1:1", response_mode);
        let app = Application::with_editor(config.clone(), editor)
            .await
            .expect("Failed to build test application");
        Self::start(app, config, storage_root).await
    }

    async fn start(app: Application, config: Config, storage_root: String) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to come up by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            storage_root,
            upload_dir: config.storage.upload_dir,
            edited_dir: config.storage.edited_dir,
        }
    }

    pub async fn post_edit(&self, form: multipart::Form) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/edit-image", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub fn uploaded_files(&self) -> Vec<String> {
        list_files(&self.upload_dir)
    }

    pub fn edited_files(&self) -> Vec<String> {
        list_files(&self.edited_dir)
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.storage_root).await;
    }
}

fn list_files(dir: &str) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// A multipart form with both fields filled in, the shape browsers send.
pub fn edit_form(prompt: &str, image_bytes: Vec<u8>) -> multipart::Form {
    multipart::Form::new().text("prompt", prompt.to_string()).part(
        "image",
        multipart::Part::bytes(image_bytes)
            .file_name("photo.png")
            .mime_str("image/png")
            .unwrap(),
    )
}

/// Bytes that sniff as PNG without being a renderable image.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(b"test image payload");
    bytes
}
