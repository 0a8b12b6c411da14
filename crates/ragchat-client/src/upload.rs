use std::time::Duration;

use async_trait::async_trait;
use ragchat_config::UploadConfig;
use ragchat_core::{SelectedFile, UploadError, UploadResult, Uploader, FILE_FIELD};
use reqwest::multipart::{Form, Part};
use reqwest::Client;

/// Posts the selected file as `multipart/form-data` to the upload endpoint
#[derive(Debug, Clone)]
pub struct HttpUploader {
    endpoint: String,
    extra_fields: Vec<(String, String)>,
    client: Client,
}

impl HttpUploader {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            extra_fields: Vec::new(),
            client: Client::new(),
        }
    }

    /// Build an uploader from the `upload` config section
    pub fn from_config(config: &UploadConfig) -> UploadResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| UploadError::transport(format!("Failed to build HTTP client: {}", e)))?;

        let mut uploader = Self {
            endpoint: config.url(),
            extra_fields: Vec::new(),
            client,
        };
        for (name, value) in &config.extra_fields {
            uploader = uploader.with_field(name.as_str(), value.as_str())?;
        }
        Ok(uploader)
    }

    /// Add a text field sent alongside the file.
    ///
    /// The file part's own name is reserved; a second `file` part would
    /// shadow the upload.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> UploadResult<Self> {
        let name = name.into();
        if name == FILE_FIELD {
            return Err(UploadError::ReservedField { name });
        }
        self.extra_fields.push((name, value.into()));
        Ok(self)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn build_form(&self, file: &SelectedFile) -> UploadResult<Form> {
        let bytes = tokio::fs::read(file.path())
            .await
            .map_err(|source| UploadError::Read {
                name: file.name().to_string(),
                source,
            })?;

        let mut form = Form::new().part(
            FILE_FIELD,
            Part::bytes(bytes).file_name(file.name().to_string()),
        );
        for (name, value) in &self.extra_fields {
            form = form.text(name.clone(), value.clone());
        }
        Ok(form)
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, file: &SelectedFile) -> UploadResult<()> {
        let form = self.build_form(file).await?;

        tracing::debug!("POST {} ({})", self.endpoint, file.name());
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
