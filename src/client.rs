use crate::attachments::AttachmentService;
use crate::config::ClientConfig;
use crate::error::{ClientError, RequestError, TeamUrlError};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::header;
use reqwest::multipart::Form;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Characters escaped when a caller-supplied value becomes one path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// esa.io API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    access_token: Option<String>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|source| ClientError::InvalidBaseUrl {
                url: config.base_url.clone(),
                source,
            })?;

        let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            access_token: config.access_token,
        })
    }

    pub fn attachments(&self) -> AttachmentService<'_> {
        AttachmentService::new(self)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `<base_url>/<team><path>`, escaping `team` as a single segment.
    ///
    /// `.` and `..` are refused: URL parsing resolves them (even percent-encoded)
    /// instead of keeping them as a segment.
    pub fn team_url(&self, team: &str, path: &str) -> Result<Url, TeamUrlError> {
        if team == "." || team == ".." {
            return Err(TeamUrlError::DotSegment(team.to_string()));
        }

        let base = self.base_url.as_str().trim_end_matches('/');
        let team = utf8_percent_encode(team, PATH_SEGMENT);
        Ok(Url::parse(&format!("{base}/{team}{path}"))?)
    }

    /// Authenticated `application/x-www-form-urlencoded` POST decoding a JSON reply.
    ///
    /// Any non-2xx status is an error; the body is not inspected in that case.
    pub async fn post_form<B, T>(&self, url: Url, form: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_urlencoded::to_string(form)?;

        let mut request = self
            .http
            .post(url)
            .header(
                header::CONTENT_TYPE,
                mime::APPLICATION_WWW_FORM_URLENCODED.as_ref(),
            )
            .body(body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status { status });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Unauthenticated multipart POST returning the raw response.
    ///
    /// The target is a third-party endpoint, so esa credentials are never attached.
    pub async fn post_multipart(
        &self,
        url: Url,
        form: Form,
    ) -> Result<reqwest::Response, RequestError> {
        Ok(self.http.post(url).multipart(form).send().await?)
    }
}
