//! WebDAV listing of the remote image library.

use std::time::Duration;

use percent_encoding::percent_decode_str;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method};
use roxmltree::{Document, Node};
use url::Url;

use crate::error::{AuditError, Result};
use crate::path::normalize_path;
use crate::progress::{is_progress_tick, Progress, ProgressEvent};
use crate::types::RemoteFileSet;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:propfind xmlns:D="DAV:">
    <D:allprop/>
</D:propfind>"#;

#[derive(Clone)]
pub struct WebDavCredentials {
    pub username: String,
    pub password: String,
}

impl WebDavCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for WebDavCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDavCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A WebDAV library URL split into the server origin and the library path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub base_url: Url,
    pub remote_path: String,
}

impl RemoteTarget {
    /// Parses a full library URL; fails before any I/O when it is unusable.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AuditError::Config(format!(
                "WebDAV URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(AuditError::Config(format!("WebDAV URL has no host: {raw}")));
        }
        let mut base_url = url.clone();
        base_url.set_path("/");
        base_url.set_query(None);
        base_url.set_fragment(None);
        Ok(Self {
            base_url,
            remote_path: url.path().to_string(),
        })
    }

    pub fn url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&self.remote_path);
        url
    }
}

#[derive(Debug, Clone)]
pub struct WebDavClient {
    http: Client,
    credentials: WebDavCredentials,
}

impl WebDavClient {
    pub fn new(credentials: WebDavCredentials) -> Result<Self> {
        Self::with_timeout(credentials, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(credentials: WebDavCredentials, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AuditError::Network)?;
        Ok(Self { http, credentials })
    }

    /// Lists every file below `target` with one `Depth: infinity` PROPFIND.
    ///
    /// Returned paths are normalized and relative to `base_path_to_strip`.
    pub async fn list_files(
        &self,
        target: &RemoteTarget,
        base_path_to_strip: &str,
        progress: &Progress,
    ) -> Result<RemoteFileSet> {
        let body = self.propfind(&target.url()).await?;
        parse_multistatus(&body, base_path_to_strip, progress)
    }

    async fn propfind(&self, url: &Url) -> Result<String> {
        let method = Method::from_bytes(b"PROPFIND")
            .map_err(|e| AuditError::Unknown(format!("PROPFIND method rejected: {e}")))?;
        tracing::debug!(%url, "sending PROPFIND");

        let response = self
            .http
            .request(method, url.clone())
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/xml; charset=utf-8"),
            )
            .header("Depth", "infinity")
            .body(PROPFIND_BODY)
            .send()
            .await
            .map_err(AuditError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("request rejected");
            return Err(AuditError::remote_request(status, reason));
        }
        response.text().await.map_err(AuditError::Network)
    }
}

/// Turns a multistatus body into the set of normalized file paths it lists.
///
/// Collections are skipped. Each href is percent-decoded, reduced to its path
/// when absolute, stripped of one leading slash and of `base_path_to_strip`.
pub fn parse_multistatus(
    body: &str,
    base_path_to_strip: &str,
    progress: &Progress,
) -> Result<RemoteFileSet> {
    let doc = Document::parse(body).map_err(|e| AuditError::RemoteParse(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "multistatus" {
        return Err(AuditError::RemoteParse(format!(
            "expected a multistatus document, found <{}>",
            root.tag_name().name()
        )));
    }

    let base = strip_leading_slash(&decode(base_path_to_strip)).to_string();
    let mut files = RemoteFileSet::new();
    let mut file_count = 0u64;

    for response in children_named(root, "response") {
        let Some(href) = children_named(response, "href").find_map(|n| n.text()) else {
            continue;
        };
        if is_collection(response) {
            continue;
        }

        file_count += 1;
        if is_progress_tick(file_count) {
            progress.emit(ProgressEvent::WebdavScan { count: file_count });
        }

        let normalized = normalize_path(&relative_path(href.trim(), &base));
        if !normalized.is_empty() {
            files.insert(normalized);
        }
    }

    Ok(files)
}

fn children_named<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

fn is_collection(response: Node<'_, '_>) -> bool {
    children_named(response, "propstat")
        .flat_map(|propstat| children_named(propstat, "prop"))
        .flat_map(|prop| children_named(prop, "resourcetype"))
        .any(|resource_type| children_named(resource_type, "collection").next().is_some())
}

fn relative_path(href: &str, base: &str) -> String {
    let path = match Url::parse(href) {
        Ok(url) => url.path().to_string(),
        Err(_) => href.to_string(),
    };
    let decoded = decode(&path);
    let path = strip_leading_slash(&decoded);
    match path.strip_prefix(base) {
        Some(rest) if !base.is_empty() => rest.to_string(),
        _ => path.to_string(),
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

fn strip_leading_slash(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}
