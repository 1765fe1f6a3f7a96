//! HTTP gateway for the Tistory Open API.
//!
//! The HTTP library is abstracted behind [`HttpClient`] so the gateway can
//! be driven by a scripted client in tests. [`ReqwestClient`] is the
//! production implementation.

use crate::error::{SyncError, SyncResult};
use crate::gateway::{BlogGateway, PostPage, PostSummary, Session, WritePost};
use crate::visibility::Visibility;
use chrono::NaiveDate;
use reqwest::Url;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Base URL of the platform.
pub const DEFAULT_BASE_URL: &str = "https://www.tistory.com";

/// A completed HTTP exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// URL of the final request after redirects.
    pub url: String,
    /// `Location` header of an unfollowed redirect.
    pub location: Option<String>,
    /// Response body.
    pub body: String,
}

/// HTTP client abstraction.
///
/// Errors are transport failures (DNS, TLS, timeouts); any response with a
/// status code is returned as `Ok`.
pub trait HttpClient: Send + Sync {
    /// Sends a GET request with query parameters.
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, String>;

    /// Sends a POST request with a form-encoded body.
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<HttpResponse, String>;
}

/// Registered application of the blog platform.
#[derive(Clone, PartialEq, Eq)]
pub struct AppKey {
    /// Application (client) id.
    pub client_id: String,
    /// Application secret.
    pub client_secret: String,
    /// Redirect URI registered for the application.
    pub redirect_uri: String,
}

/// How the gateway obtains an access token.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A token issued beforehand.
    AccessToken(String),
    /// Application key plus account login (authorization-code flow).
    Account {
        /// Application key.
        app: AppKey,
        /// Account login id.
        user_id: String,
        /// Account password.
        password: String,
    },
}

impl Credentials {
    /// Builds credentials from optional parts, checking that pairs are complete.
    ///
    /// An access token takes precedence over account login.
    pub fn from_parts(
        access_token: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
        user_id: Option<String>,
        password: Option<String>,
        redirect_uri: Option<String>,
    ) -> SyncResult<Self> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

        if let Some(token) = access_token.filter(|t| !t.trim().is_empty()) {
            return Ok(Credentials::AccessToken(token));
        }
        if present(&client_id) != present(&client_secret) {
            return Err(SyncError::Configuration(
                "client id and client secret must be given together".into(),
            ));
        }
        if !present(&client_id) {
            return Err(SyncError::Configuration(
                "either an access token or an application key pair is required".into(),
            ));
        }
        if !present(&user_id) || !present(&password) {
            return Err(SyncError::Configuration(
                "account id and password are required to log in".into(),
            ));
        }
        Ok(Credentials::Account {
            app: AppKey {
                client_id: client_id.unwrap_or_default(),
                client_secret: client_secret.unwrap_or_default(),
                redirect_uri: redirect_uri.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            },
            user_id: user_id.unwrap_or_default(),
            password: password.unwrap_or_default(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::AccessToken(_) => f.write_str("Credentials::AccessToken(<redacted>)"),
            Credentials::Account { app, user_id, .. } => f
                .debug_struct("Credentials::Account")
                .field("client_id", &app.client_id)
                .field("user_id", user_id)
                .finish_non_exhaustive(),
        }
    }
}

/// Gateway speaking the Tistory Open API v1 (JSON output).
pub struct TistoryGateway<C: HttpClient> {
    base_url: String,
    client: C,
    credentials: Credentials,
}

impl<C: HttpClient> TistoryGateway<C> {
    /// Creates a gateway against [`DEFAULT_BASE_URL`].
    pub fn new(client: C, credentials: Credentials) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, client, credentials)
    }

    /// Creates a gateway against another base URL.
    pub fn with_base_url(base_url: impl Into<String>, client: C, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            credentials,
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn api_get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> SyncResult<T> {
        let response = self
            .client
            .get(&self.url(path), query)
            .map_err(SyncError::remote_retryable)?;
        parse_api(path, &response)
    }

    fn api_post<T: DeserializeOwned>(&self, path: &str, form: &[(&str, &str)]) -> SyncResult<T> {
        let response = self
            .client
            .post_form(&self.url(path), form)
            .map_err(SyncError::remote_retryable)?;
        parse_api(path, &response)
    }

    fn login(&self, app: &AppKey, user_id: &str, password: &str) -> SyncResult<Session> {
        let authorize = Url::parse_with_params(
            &self.url("/oauth/authorize"),
            &[
                ("client_id", app.client_id.as_str()),
                ("redirect_uri", app.redirect_uri.as_str()),
                ("response_type", "code"),
            ],
        )
        .map_err(|e| SyncError::Configuration(format!("invalid base url: {e}")))?;

        let response = self
            .client
            .post_form(
                &self.url("/auth/login"),
                &[
                    ("loginId", user_id),
                    ("password", password),
                    ("redirectUrl", authorize.as_str()),
                ],
            )
            .map_err(SyncError::remote_retryable)?;
        if response.status >= 500 {
            return Err(SyncError::remote_retryable(format!(
                "login answered HTTP {}",
                response.status
            )));
        }

        let code = authorization_code(&response).ok_or_else(|| {
            SyncError::AuthenticationFailed("login did not yield an authorization code".into())
        })?;
        debug!("authorization code received");

        let response = self
            .client
            .get(
                &self.url("/oauth/access_token"),
                &[
                    ("client_id", app.client_id.as_str()),
                    ("client_secret", app.client_secret.as_str()),
                    ("redirect_uri", app.redirect_uri.as_str()),
                    ("code", code.as_str()),
                    ("grant_type", "authorization_code"),
                ],
            )
            .map_err(SyncError::remote_retryable)?;
        if response.status >= 500 {
            return Err(SyncError::remote_retryable(format!(
                "token exchange answered HTTP {}",
                response.status
            )));
        }

        response
            .body
            .trim()
            .strip_prefix("access_token=")
            .filter(|token| !token.is_empty())
            .map(Session::new)
            .ok_or_else(|| {
                SyncError::AuthenticationFailed(format!(
                    "token exchange rejected: {}",
                    response.body.trim()
                ))
            })
    }
}

impl<C: HttpClient> BlogGateway for TistoryGateway<C> {
    fn authenticate(&self) -> SyncResult<Session> {
        match &self.credentials {
            Credentials::AccessToken(token) => Ok(Session::new(token.clone())),
            Credentials::Account {
                app,
                user_id,
                password,
            } => self.login(app, user_id, password),
        }
    }

    fn read_post(&self, session: &Session, blog: &str, post_id: &str) -> SyncResult<String> {
        let item: ReadItem = self.api_get(
            "/apis/post/read",
            &[
                ("access_token", session.access_token()),
                ("output", "json"),
                ("blogName", blog),
                ("postId", post_id),
            ],
        )?;
        Ok(item.content)
    }

    fn write_post(&self, session: &Session, post: &WritePost) -> SyncResult<()> {
        let _: IgnoredAny = self.api_post(
            "/apis/post/modify",
            &[
                ("access_token", session.access_token()),
                ("output", "json"),
                ("blogName", post.blog.as_str()),
                ("postId", post.post_id.as_str()),
                ("title", post.title.as_str()),
                ("content", post.content.as_str()),
                ("visibility", post.visibility.api_code()),
            ],
        )?;
        Ok(())
    }

    fn list_posts_page(&self, session: &Session, blog: &str, page: u32) -> SyncResult<PostPage> {
        let page = page.to_string();
        let item: ListItem = self.api_get(
            "/apis/post/list",
            &[
                ("access_token", session.access_token()),
                ("output", "json"),
                ("blogName", blog),
                ("page", page.as_str()),
            ],
        )?;

        let posts = item
            .posts
            .iter()
            .map(|post| {
                Ok(PostSummary::new(
                    post_date(&post.date)?,
                    Visibility::from_api_code(&post.visibility.to_string()),
                ))
            })
            .collect::<SyncResult<Vec<_>>>()?;
        let total_count = item.total_count.as_u32().ok_or_else(|| {
            SyncError::Protocol(format!("invalid totalCount: {}", item.total_count))
        })?;

        Ok(PostPage { posts, total_count })
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    tistory: ApiBody<T>,
}

#[derive(Debug, Deserialize)]
struct ApiBody<T> {
    status: ApiNumber,
    error_message: Option<String>,
    item: Option<T>,
}

/// A number the API sends either as a JSON number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ApiNumber {
    Number(u64),
    Text(String),
}

impl ApiNumber {
    fn as_u32(&self) -> Option<u32> {
        match self {
            ApiNumber::Number(n) => u32::try_from(*n).ok(),
            ApiNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ApiNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiNumber::Number(n) => write!(f, "{n}"),
            ApiNumber::Text(s) => f.write_str(s.trim()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListItem {
    #[serde(rename = "totalCount")]
    total_count: ApiNumber,
    #[serde(default)]
    posts: Vec<RawPost>,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    date: String,
    visibility: ApiNumber,
}

#[derive(Debug, Deserialize)]
struct ReadItem {
    content: String,
}

fn parse_api<T: DeserializeOwned>(endpoint: &str, response: &HttpResponse) -> SyncResult<T> {
    let envelope: Envelope<T> = match serde_json::from_str(&response.body) {
        Ok(envelope) => envelope,
        Err(e) if response.status >= 500 => {
            return Err(SyncError::remote_retryable(format!(
                "{endpoint} answered HTTP {}: {e}",
                response.status
            )))
        }
        Err(e) => {
            return Err(SyncError::Protocol(format!(
                "{endpoint} answered undecodable body (HTTP {}): {e}",
                response.status
            )))
        }
    };

    let body = envelope.tistory;
    let status = body.status.as_u32().unwrap_or(0);
    let message = body.error_message.unwrap_or_default();
    match status {
        200 => body
            .item
            .ok_or_else(|| SyncError::Protocol(format!("{endpoint} answered without item"))),
        401 | 403 => Err(SyncError::AuthenticationFailed(format!(
            "{endpoint}: {message}"
        ))),
        s if s >= 500 => Err(SyncError::remote_retryable(format!(
            "{endpoint} status {s}: {message}"
        ))),
        s => Err(SyncError::remote_fatal(format!(
            "{endpoint} status {s}: {message}"
        ))),
    }
}

fn post_date(raw: &str) -> SyncResult<NaiveDate> {
    raw.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .ok_or_else(|| SyncError::Protocol(format!("invalid post date: {raw:?}")))
}

fn authorization_code(response: &HttpResponse) -> Option<String> {
    response
        .location
        .iter()
        .chain(std::iter::once(&response.url))
        .filter_map(|candidate| Url::parse(candidate).ok())
        .find_map(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "code")
                .map(|(_, value)| value.into_owned())
        })
}

/// [`HttpClient`] backed by a blocking `reqwest` client with a cookie store.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a client with the given request timeout.
    ///
    /// Redirects are followed until one carries an authorization `code`,
    /// which is returned unfollowed so the redirect target never has to exist.
    pub fn new(timeout: Duration) -> SyncResult<Self> {
        let policy = reqwest::redirect::Policy::custom(|attempt| {
            if attempt.url().query_pairs().any(|(key, _)| key == "code") {
                attempt.stop()
            } else if attempt.previous().len() > 10 {
                attempt.error("too many redirects")
            } else {
                attempt.follow()
            }
        });
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("postlog/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .redirect(policy)
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn finish(response: reqwest::blocking::Response) -> Result<HttpResponse, String> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().map_err(|e| e.to_string())?;
        Ok(HttpResponse {
            status,
            url,
            location,
            body,
        })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, String> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| e.to_string())?;
        Self::finish(response)
    }

    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<HttpResponse, String> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .map_err(|e| e.to_string())?;
        Self::finish(response)
    }
}
