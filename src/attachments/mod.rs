//! Attachment uploads.
//!
//! esa stores attachments in S3-compatible object storage. Uploading is a
//! two-step exchange: esa issues a presigned POST policy for the file, and the
//! file is then posted directly to the storage endpoint named by that policy.

pub mod inspect;
pub mod policy;
pub mod upload;

use crate::client::Client;
use crate::error::{AttachmentError, FileError, PolicyError, UploadError};
use inspect::FileMetadata;
use policy::UploadPolicy;
use std::fmt;
use std::path::Path;

/// Stage of a single upload, in the order they run.
///
/// A failure in any stage ends the upload; [`AttachmentError::stage`] names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Inspecting,
    PolicyRequested,
    Uploading,
    Done,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStage::Inspecting => "inspecting",
            UploadStage::PolicyRequested => "requesting policy",
            UploadStage::Uploading => "uploading",
            UploadStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Attachment operations for one [`Client`]
pub struct AttachmentService<'a> {
    client: &'a Client,
}

impl<'a> AttachmentService<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn inspect(&self, path: impl AsRef<Path>) -> Result<FileMetadata, FileError> {
        inspect::inspect(path).await
    }

    pub async fn request_policy(
        &self,
        team: &str,
        metadata: &FileMetadata,
    ) -> Result<UploadPolicy, PolicyError> {
        policy::request_policy(self.client, team, metadata).await
    }

    pub async fn execute(
        &self,
        policy: UploadPolicy,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<String, UploadError> {
        upload::execute(self.client, policy, file_name, content).await
    }

    /// Uploads the file at `path` to `team` and returns its public URL.
    ///
    /// Every call obtains a new policy, so uploading the same file twice
    /// produces two distinct objects.
    pub async fn upload_file(
        &self,
        team: &str,
        path: impl AsRef<Path>,
    ) -> Result<String, AttachmentError> {
        let path = path.as_ref();

        tracing::debug!(stage = %UploadStage::Inspecting, path = %path.display());
        let metadata = self.inspect(path).await?;

        tracing::debug!(
            stage = %UploadStage::PolicyRequested,
            team,
            name = %metadata.name,
            size = metadata.size,
            content_type = %metadata.content_type
        );
        let policy = self.request_policy(team, &metadata).await?;

        let FileMetadata { name, content, .. } = metadata;
        tracing::debug!(stage = %UploadStage::Uploading, endpoint = %policy.attachment.endpoint);
        let url = self.execute(policy, &name, content).await?;

        tracing::info!(stage = %UploadStage::Done, team, name = %name, url = %url, "attachment uploaded");
        Ok(url)
    }
}
