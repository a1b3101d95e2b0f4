//! Google Drive v3 client.
//!
//! Talks to the REST API directly with `reqwest`. Every request carries a
//! bearer token from the configured [`TokenSource`]. Uploads are single-shot
//! `multipart/related` requests, so the whole payload is sent in one body.

use super::FolderStream;
use crate::DestinationClient;
use crate::auth::TokenSource;
use crate::error::{ErrorKind, Result};
use crate::models::{Folder, FolderId, Role};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use url::Url;

const DEFAULT_API_URL: &str = "https://www.googleapis.com/drive/v3/";
const DEFAULT_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/";
pub(crate) const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const FOLDER_QUERY: &str = "mimeType='application/vnd.google-apps.folder' and trashed=false";
const PAGE_SIZE: &str = "1000";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<Folder>,
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

/// Google Drive client.
///
/// # Examples
///
/// ```no_run
/// use crosscloud_destination::{DestinationClient, DriveClient};
/// use crosscloud_destination::auth::{ServiceAccountKey, TokenSource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let key = ServiceAccountKey::from_file("service-account.json")?;
/// let drive = DriveClient::new(reqwest::Client::new(), TokenSource::service_account(key)?);
/// for folder in drive.list_folders().await? {
///     println!("{}: {}", folder.name, folder.id);
/// }
/// # Ok(())
/// # }
/// ```
pub struct DriveClient {
    http: reqwest::Client,
    tokens: TokenSource,
    api: Url,
    upload: Url,
}

impl DriveClient {
    /// Create a client against the public Drive endpoints.
    pub fn new(http: reqwest::Client, tokens: TokenSource) -> Self {
        // Infallible: both are constant, valid URLs.
        let api = Url::parse(DEFAULT_API_URL).expect("valid Drive API URL");
        let upload = Url::parse(DEFAULT_UPLOAD_URL).expect("valid Drive upload URL");
        Self {
            http,
            tokens,
            api,
            upload,
        }
    }

    /// Point the client at different API and upload base URLs (both must end
    /// with a slash).
    pub fn with_endpoints(mut self, api: Url, upload: Url) -> Self {
        self.api = api;
        self.upload = upload;
        self
    }

    fn endpoint(base: &Url, path: &str) -> Result<Url> {
        base.join(path).or_raise(|| ErrorKind::Request)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let token = self.tokens.access_token(&self.http).await?;
        let response = request.bearer_auth(token).send().await.or_raise(|| ErrorKind::Request)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %body, "Drive rejected request");
        exn::bail!(ErrorKind::Status(status.as_u16()))
    }

    async fn list_page(&self, page_token: Option<&str>) -> Result<FileList> {
        let mut url = Self::endpoint(&self.api, "files")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("q", FOLDER_QUERY)
                .append_pair("fields", "nextPageToken, files(id, name)")
                .append_pair("pageSize", PAGE_SIZE);
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        self.send(self.http.get(url)).await?.json().await.or_raise(|| ErrorKind::Decode)
    }
}

/// Pick a boundary whose delimiter line occurs in none of `parts`.
fn boundary_for(seed: i128, parts: &[&[u8]]) -> String {
    let mut attempt = 0u32;
    loop {
        let boundary = format!("crosscloud-{seed}-{attempt}");
        let delimiter = format!("--{boundary}");
        let collides =
            parts.iter().any(|part| part.windows(delimiter.len()).any(|window| window == delimiter.as_bytes()));
        if !collides {
            return boundary;
        }
        attempt += 1;
    }
}

/// Build a `multipart/related` upload body: JSON metadata first, then the
/// raw content.
fn multipart_body(boundary: &str, metadata: &serde_json::Value, data: &[u8]) -> Vec<u8> {
    let metadata = metadata.to_string();
    let mut body = Vec::with_capacity(data.len() + metadata.len() + 4 * boundary.len() + 128);
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n").as_bytes());
    body.extend_from_slice(metadata.as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\nContent-Type: application/octet-stream\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[async_trait]
impl DestinationClient for DriveClient {
    fn name(&self) -> &str {
        "drive"
    }

    fn folder_stream(&self) -> FolderStream<'_> {
        Box::pin(stream! {
            let mut page_token: Option<String> = None;
            loop {
                let FileList { next_page_token, files } = match self.list_page(page_token.as_deref()).await {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(e);
                        return;
                    },
                };
                for folder in files {
                    yield Ok(folder);
                }
                match next_page_token {
                    Some(token) if !token.is_empty() => page_token = Some(token),
                    _ => break,
                }
            }
        })
    }

    async fn create_folder(&self, name: &str) -> Result<FolderId> {
        let mut url = Self::endpoint(&self.api, "files")?;
        url.query_pairs_mut().append_pair("fields", "id");
        let metadata = json!({ "name": name, "mimeType": FOLDER_MIME_TYPE });
        let created: Created =
            self.send(self.http.post(url).json(&metadata)).await?.json().await.or_raise(|| ErrorKind::Decode)?;
        tracing::debug!(folder = %name, id = %created.id, "Created Drive folder");
        Ok(FolderId::new(created.id))
    }

    async fn create_permission(&self, folder: &FolderId, grantee: &str, role: Role) -> Result<()> {
        let url = Self::endpoint(&self.api, &format!("files/{}/permissions", folder.as_str()))?;
        let permission = json!({ "type": "user", "role": role.as_str(), "emailAddress": grantee });
        self.send(self.http.post(url).json(&permission)).await?;
        Ok(())
    }

    async fn create_file(&self, name: &str, parent: &FolderId, data: Vec<u8>) -> Result<String> {
        let mut url = Self::endpoint(&self.upload, "files")?;
        url.query_pairs_mut().append_pair("uploadType", "multipart").append_pair("fields", "id");
        let metadata = json!({ "name": name, "parents": [parent.as_str()] });
        let boundary = boundary_for(
            OffsetDateTime::now_utc().unix_timestamp_nanos(),
            &[metadata.to_string().as_bytes(), data.as_slice()],
        );
        let body = multipart_body(&boundary, &metadata, &data);
        let request = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, format!("multipart/related; boundary={boundary}"))
            .body(body);
        let created: Created = self.send(request).await?.json().await.or_raise(|| ErrorKind::Decode)?;
        Ok(created.id)
    }
}
