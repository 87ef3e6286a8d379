use crate::attachments::inspect::FileMetadata;
use crate::client::Client;
use crate::error::PolicyError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Team-relative path of the policy endpoint.
///
/// The endpoint is a beta feature of esa and is not part of the documented API,
/// so the response schema is decoded strictly.
pub const POLICY_PATH: &str = "/attachments/policies";

/// Form body sent to the policy endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRequest {
    #[serde(rename = "type")]
    pub content_type: String,
    pub name: String,
    pub size: u64,
}

impl fmt::Display for PolicyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type={}, name={}, size={}",
            self.content_type, self.name, self.size
        )
    }
}

/// Single-use authorization for one direct upload to object storage.
///
/// Not `Clone`; [`crate::attachments::upload::execute`] takes it by value.
#[derive(Debug, PartialEq, Eq, Deserialize)]
pub struct UploadPolicy {
    pub attachment: AttachmentTarget,
    pub form: PolicyForm,
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
pub struct AttachmentTarget {
    /// Object storage URL the multipart form is posted to
    pub endpoint: String,
    /// Public URL of the object once uploaded
    pub url: String,
}

/// Presigned-POST fields, echoed back to object storage verbatim
#[derive(Debug, PartialEq, Eq, Deserialize)]
pub struct PolicyForm {
    #[serde(rename = "AWSAccessKeyId")]
    pub aws_access_key_id: String,
    pub signature: String,
    pub policy: String,
    pub key: String,
    #[serde(rename = "Content-Type")]
    pub content_type: String,
    #[serde(rename = "Cache-Control")]
    pub cache_control: String,
    #[serde(rename = "Content-Disposition")]
    pub content_disposition: String,
    pub acl: String,
}

impl PolicyForm {
    /// Form fields in the order object storage expects them.
    pub fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("AWSAccessKeyId", self.aws_access_key_id.as_str()),
            ("signature", self.signature.as_str()),
            ("policy", self.policy.as_str()),
            ("key", self.key.as_str()),
            ("Content-Type", self.content_type.as_str()),
            ("Cache-Control", self.cache_control.as_str()),
            ("Content-Disposition", self.content_disposition.as_str()),
            ("acl", self.acl.as_str()),
        ]
    }
}

/// Asks esa for a fresh upload policy for `metadata` within `team`.
pub async fn request_policy(
    client: &Client,
    team: &str,
    metadata: &FileMetadata,
) -> Result<UploadPolicy, PolicyError> {
    let url = client
        .team_url(team, POLICY_PATH)
        .map_err(|source| PolicyError::InvalidUrl {
            team: team.to_string(),
            source,
        })?;
    let request = metadata.policy_request();

    tracing::debug!(team, url = %url, %request, "requesting attachment policy");

    match client.post_form(url.clone(), &request).await {
        Ok(policy) => Ok(policy),
        Err(source) => Err(PolicyError::Request {
            team: team.to_string(),
            url,
            request,
            source,
        }),
    }
}
