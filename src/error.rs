use crate::attachments::UploadStage;
use crate::attachments::policy::PolicyRequest;
use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Errors raised while building a [`crate::Client`]
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP client error: {0}")]
    Build(#[from] reqwest::Error),
}

/// Failure of a single HTTP exchange, before stage context is attached
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status}")]
    Status { status: StatusCode },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("could not encode form body: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
}

impl RequestError {
    /// HTTP status of a rejected request, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Status { status } => Some(*status),
            RequestError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

/// A team name that cannot be placed into a request URL
#[derive(Error, Debug)]
pub enum TeamUrlError {
    #[error("team '{0}' is a dot path segment")]
    DotSegment(String),

    #[error("invalid URL: {0}")]
    Parse(#[from] url::ParseError),
}

/// Local file could not be inspected
#[derive(Error, Debug)]
pub enum FileError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a regular file", .path.display())]
    NotAFile { path: PathBuf },

    #[error("{} has no file name component", .path.display())]
    NoFileName { path: PathBuf },
}

/// The policy endpoint could not issue a usable upload policy
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("invalid policy URL for team '{team}': {source}")]
    InvalidUrl {
        team: String,
        #[source]
        source: TeamUrlError,
    },

    #[error("policy request for team '{team}' to {url} failed ({request}): {source}")]
    Request {
        team: String,
        url: Url,
        request: PolicyRequest,
        #[source]
        source: RequestError,
    },
}

/// Object storage did not accept the upload
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("invalid upload endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("upload to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: RequestError,
    },

    #[error("upload to {endpoint} rejected: {status}")]
    Rejected { endpoint: String, status: StatusCode },
}

impl UploadError {
    pub fn endpoint(&self) -> &str {
        match self {
            UploadError::InvalidEndpoint { endpoint, .. }
            | UploadError::Request { endpoint, .. }
            | UploadError::Rejected { endpoint, .. } => endpoint,
        }
    }
}

/// Error returned by [`crate::AttachmentService::upload_file`], tagged with the failing stage
#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("inspecting failed: {0}")]
    Inspect(#[from] FileError),

    #[error("requesting policy failed: {0}")]
    Policy(#[from] PolicyError),

    #[error("uploading failed: {0}")]
    Upload(#[from] UploadError),
}

impl AttachmentError {
    pub fn stage(&self) -> UploadStage {
        match self {
            AttachmentError::Inspect(_) => UploadStage::Inspecting,
            AttachmentError::Policy(_) => UploadStage::PolicyRequested,
            AttachmentError::Upload(_) => UploadStage::Uploading,
        }
    }
}
