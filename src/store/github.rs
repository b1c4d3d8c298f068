use std::time::Duration;

use base64::Engine;
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ContentApi, FileWrite, RemoteFile, StoreError, VersionToken};
use crate::config::StoreConfig;

const API_VERSION: &str = "2022-11-28";

/// Client for one file of a GitHub repository, via the contents API.
///
/// Reads `GET /repos/{owner}/{repo}/contents/{path}?ref={branch}` and writes
/// with `PUT` on the same resource, passing the blob sha as precondition.
pub struct GithubContents {
    client: Client,
    url: Url,
    branch: String,
    token: String,
    location: String,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GithubContents {
    /// Build a client for the file described by `config`.
    ///
    /// # Errors
    /// Returns [`StoreError::Network`] if the HTTP client cannot be built, or
    /// [`StoreError::Http`] for an unusable API URL.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .user_agent(concat!("dropboard/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| StoreError::Network(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            url: contents_url(config)?,
            branch: config.branch.clone(),
            token: config.token.clone(),
            location: config.location(),
        })
    }

    fn read_url(&self) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("ref", &self.branch);
        url
    }
}

impl std::fmt::Debug for GithubContents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubContents")
            .field("url", &self.url.as_str())
            .field("branch", &self.branch)
            .finish_non_exhaustive()
    }
}

impl ContentApi for GithubContents {
    fn describe(&self) -> String {
        self.location.clone()
    }

    fn read(&self) -> Result<RemoteFile, StoreError> {
        let url = self.read_url();
        debug!(%url, "GET contents");
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(network_error)?;
        let response = check_status(response)?;
        let body: ContentsResponse = response
            .json()
            .map_err(|err| StoreError::Decode(format!("unexpected contents response: {err}")))?;
        if body.encoding.as_deref().is_some_and(|enc| enc != "base64") {
            return Err(StoreError::Decode(format!(
                "unsupported content encoding {:?}",
                body.encoding.unwrap_or_default()
            )));
        }
        Ok(RemoteFile {
            text: decode_content(&body.content)?,
            version: VersionToken::new(body.sha),
        })
    }

    fn write(&self, write: &FileWrite) -> Result<(), StoreError> {
        let body = PutBody {
            message: &write.message,
            content: encode_content(&write.text),
            sha: write.version.as_ref().map(VersionToken::as_str),
            branch: &self.branch,
        };
        debug!(url = %self.url, sha = ?body.sha, "PUT contents");
        let response = self
            .client
            .put(self.url.clone())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(network_error)?;
        check_status(response)?;
        Ok(())
    }
}

fn contents_url(config: &StoreConfig) -> Result<Url, StoreError> {
    let base = config.api_url.trim_end_matches('/');
    let path = config.path.trim_start_matches('/');
    let raw = format!(
        "{base}/repos/{}/{}/contents/{path}",
        config.owner, config.repo
    );
    Url::parse(&raw).map_err(|err| StoreError::Http {
        status: 0,
        message: format!("invalid API URL {raw}: {err}"),
    })
}

fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(StoreError::from_status(status.as_u16(), error_message(&body)))
}

fn network_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Network("request timed out".to_string())
    } else {
        StoreError::Network(err.to_string())
    }
}

/// Extract the host's `message` field, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|err| err.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Decode the transfer-encoded file content.
///
/// The host wraps the base64 text across lines, so whitespace is dropped
/// before decoding.
fn decode_content(encoded: &str) -> Result<String, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|err| StoreError::Decode(format!("content is not valid base64: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|err| StoreError::Decode(format!("content is not valid UTF-8: {err}")))
}

fn encode_content(text: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(text.as_bytes())
}
