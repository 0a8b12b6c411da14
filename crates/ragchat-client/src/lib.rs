//! Multipart upload client.

mod upload;

pub use upload::HttpUploader;
