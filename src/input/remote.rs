use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::input::SourceError;

pub const DEFAULT_REMOTE_PATH: &str = "resumo_powerbi.csv";
const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can hand back the raw bytes of the source document.
pub trait RemoteSource: Send + Sync {
    fn describe(&self) -> String;
    fn fetch(&self) -> Result<Vec<u8>, SourceError>;
}

#[derive(Clone)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub user_upn: String,
    pub file_path: String,
}

impl std::fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_upn", &self.user_upn)
            .field("file_path", &self.file_path)
            .finish()
    }
}

impl GraphConfig {
    /// Returns `None` unless every credential is present and non-empty; an
    /// incomplete configuration means the remote is skipped, not attempted.
    pub fn from_parts(
        tenant_id: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
        user_upn: Option<String>,
        file_path: Option<String>,
    ) -> Option<Self> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Some(Self {
            tenant_id: present(tenant_id)?,
            client_id: present(client_id)?,
            client_secret: present(client_secret)?,
            user_upn: present(user_upn)?,
            file_path: present(file_path).unwrap_or_else(|| DEFAULT_REMOTE_PATH.to_string()),
        })
    }

    pub fn token_url(&self) -> String {
        format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            urlencoding::encode(&self.tenant_id)
        )
    }

    pub fn content_url(&self) -> String {
        let path = self
            .file_path
            .trim_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{GRAPH_BASE}/users/{}/drive/root:/{path}:/content",
            urlencoding::encode(&self.user_upn)
        )
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OneDrive/SharePoint document read through Microsoft Graph with the
/// client-credentials grant.
pub struct GraphSource {
    config: GraphConfig,
    client: Client,
}

impl GraphSource {
    pub fn new(config: GraphConfig) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { config, client })
    }

    fn acquire_token(&self) -> Result<String, SourceError> {
        let url = self.config.token_url();
        let resp = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
            ])
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status, url));
        }
        let token: TokenResponse = resp
            .json()
            .map_err(|e| SourceError::Auth(format!("token response unreadable: {e}")))?;
        Ok(token.access_token)
    }
}

impl RemoteSource for GraphSource {
    fn describe(&self) -> String {
        format!("graph:{}:{}", self.config.user_upn, self.config.file_path)
    }

    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        let token = self.acquire_token()?;
        let url = self.config.content_url();
        tracing::debug!(%url, "downloading remote document");
        let resp = self.client.get(&url).bearer_auth(token).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status, url));
        }
        Ok(resp.bytes()?.to_vec())
    }
}

fn status_error(status: StatusCode, url: String) -> SourceError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SourceError::Auth(format!("HTTP {} from {url}", status.as_u16()))
        }
        _ => SourceError::Http {
            status: status.as_u16(),
            url,
        },
    }
}
