use crate::error::UploadError;
use crate::submitter::SelectedFile;

/// Events emitted by the input widgets and the upload task.
///
/// Views never touch the session directly; they emit one of these and the
/// [`ChatController`](crate::ChatController) applies the transition.
#[derive(Debug)]
pub enum ChatEvent {
    /// The composer's send action was triggered
    Submit,
    /// The user picked a file
    FileSelected(SelectedFile),
    /// The upload button was pressed
    UploadRequested,
    /// A background upload returned
    UploadFinished {
        file: SelectedFile,
        result: Result<(), UploadError>,
    },
    /// A history entry was activated
    HistorySelected(usize),
}
