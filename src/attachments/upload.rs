use crate::attachments::policy::{PolicyForm, UploadPolicy};
use crate::client::Client;
use crate::error::{RequestError, UploadError};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use url::Url;

/// Posts `content` to the policy's object storage endpoint.
///
/// Object storage answers a presigned POST with 204 No Content; every other
/// status is a failure. Returns the public URL issued with the policy.
pub async fn execute(
    client: &Client,
    policy: UploadPolicy,
    file_name: &str,
    content: Vec<u8>,
) -> Result<String, UploadError> {
    let UploadPolicy { attachment, form } = policy;

    let endpoint = match Url::parse(&attachment.endpoint) {
        Ok(url) => url,
        Err(source) => {
            return Err(UploadError::InvalidEndpoint {
                endpoint: attachment.endpoint,
                source,
            });
        }
    };

    let size = content.len();
    let body = match build_form(&form, file_name, content) {
        Ok(body) => body,
        Err(e) => {
            return Err(UploadError::Request {
                endpoint: attachment.endpoint,
                source: RequestError::Transport(e),
            });
        }
    };

    tracing::debug!(endpoint = %endpoint, key = %form.key, bytes = size, "posting attachment to object storage");

    let response = match client.post_multipart(endpoint, body).await {
        Ok(response) => response,
        Err(source) => {
            return Err(UploadError::Request {
                endpoint: attachment.endpoint,
                source,
            });
        }
    };

    let status = response.status();
    // Drain so the connection goes back to the pool.
    response.bytes().await.ok();

    if status != StatusCode::NO_CONTENT {
        return Err(UploadError::Rejected {
            endpoint: attachment.endpoint,
            status,
        });
    }

    Ok(attachment.url)
}

/// Policy fields first, then the `file` part.
fn build_form(form: &PolicyForm, file_name: &str, content: Vec<u8>) -> reqwest::Result<Form> {
    let body = form
        .fields()
        .into_iter()
        .fold(Form::new(), |body, (name, value)| {
            body.text(name, value.to_string())
        });

    let file = Part::bytes(content)
        .file_name(file_name.to_string())
        .mime_str(mime::APPLICATION_OCTET_STREAM.as_ref())?;

    Ok(body.part("file", file))
}
