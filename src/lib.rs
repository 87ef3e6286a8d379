pub mod attachments;
pub mod client;
pub mod config;
pub mod error;

pub use attachments::inspect::FileMetadata;
pub use attachments::policy::{AttachmentTarget, PolicyForm, PolicyRequest, UploadPolicy};
pub use attachments::{AttachmentService, UploadStage};
pub use client::Client;
pub use config::ClientConfig;
pub use error::{
    AttachmentError, ClientError, FileError, PolicyError, RequestError, TeamUrlError,
    UploadError,
};
