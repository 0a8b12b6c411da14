//! File picker and upload state.

use std::path::{Path, PathBuf};

use crate::error::{FileSelectError, UploadResult};
use crate::session::SessionStore;
use crate::types::MessageKind;
use crate::uploader::Uploader;

/// Reference to a file chosen by the user.
///
/// Only the name and location are held; bytes are read when the upload runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    path: PathBuf,
}

impl SelectedFile {
    /// Build a selection from a path, naming it after the last path component
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FileSelectError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| FileSelectError::NoFileName {
                path: path.to_path_buf(),
            })?;

        Ok(Self {
            name,
            path: path.to_path_buf(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// What an upload call ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Nothing selected, or an upload is already in flight
    Skipped,
    /// The file was accepted and a file entry was appended
    Uploaded { name: String },
    /// The upload failed; the selection is kept for a retry
    Failed { name: String, reason: String },
}

/// Holds at most one selected file and tracks whether it is being uploaded
#[derive(Debug, Default)]
pub struct FileSubmitter {
    selected: Option<SelectedFile>,
    in_flight: bool,
}

impl FileSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a file, replacing any previous selection
    pub fn select(&mut self, file: SelectedFile) {
        if let Some(previous) = &self.selected {
            tracing::debug!("Replacing selected file {} with {}", previous.name, file.name);
        }
        self.selected = Some(file);
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Mark the selected file as in flight and hand it out for uploading.
    ///
    /// Returns `None` when nothing is selected or an upload is already running.
    pub fn begin_upload(&mut self) -> Option<SelectedFile> {
        if self.in_flight {
            tracing::debug!("Upload already in flight, ignoring request");
            return None;
        }
        let file = self.selected.clone()?;
        self.in_flight = true;
        tracing::info!("Uploading {}", file.name);
        Some(file)
    }

    /// Apply the result of an upload started with [`begin_upload`].
    ///
    /// On success a file entry is appended and the selection is cleared,
    /// unless the user picked a different file while the request was running.
    /// Failures are logged and leave the selection in place.
    ///
    /// [`begin_upload`]: FileSubmitter::begin_upload
    pub fn finish_upload(
        &mut self,
        file: SelectedFile,
        result: UploadResult<()>,
        store: &mut SessionStore,
    ) -> UploadOutcome {
        self.in_flight = false;

        match result {
            Ok(()) => {
                store.append_message(MessageKind::File, file.name.as_str());
                if self.selected.as_ref() == Some(&file) {
                    self.selected = None;
                }
                tracing::info!("Uploaded {}", file.name);
                UploadOutcome::Uploaded { name: file.name }
            }
            Err(e) => {
                tracing::error!("Error uploading file {}: {}", file.name, e);
                UploadOutcome::Failed {
                    name: file.name,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Run one upload attempt of the selected file to completion
    pub async fn upload<U>(&mut self, uploader: &U, store: &mut SessionStore) -> UploadOutcome
    where
        U: Uploader + ?Sized,
    {
        let Some(file) = self.begin_upload() else {
            return UploadOutcome::Skipped;
        };
        let result = uploader.upload(&file).await;
        self.finish_upload(file, result, store)
    }
}
