use async_trait::async_trait;

use crate::error::UploadResult;
use crate::submitter::SelectedFile;

/// Multipart field that carries the file bytes and name
pub const FILE_FIELD: &str = "file";

/// Sends one selected file to the upload endpoint.
///
/// A single attempt per call; implementations do not retry.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: &SelectedFile) -> UploadResult<()>;
}
