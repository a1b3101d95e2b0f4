//! Salesforce REST API client.
//!
//! Authenticates with the OAuth 2.0 client-credentials flow of a connected
//! app, then talks to the REST query endpoint and downloads file content from
//! the instance the token was issued for.

use super::RecordStream;
use crate::SourceClient;
use crate::error::{ErrorKind, Result};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "58.0";

/// Connected-app credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// My Domain URL, e.g. `https://example.my.salesforce.com`.
    pub domain: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    /// REST API version without the `v` prefix, e.g. `58.0`.
    pub api_version: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    instance_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryPage {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    next_records_url: Option<String>,
    #[serde(default)]
    records: Vec<Value>,
}

/// Salesforce client holding an access token for one org.
///
/// # Examples
///
/// ```no_run
/// use crosscloud_source::{Credentials, SalesforceClient, SourceClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SalesforceClient::connect(
///     reqwest::Client::new(),
///     Credentials {
///         domain: "https://example.my.salesforce.com".to_string(),
///         consumer_key: "key".to_string(),
///         consumer_secret: "secret".to_string(),
///         api_version: "58.0".to_string(),
///     },
/// )
/// .await?;
/// let accounts = client.query("SELECT Id, Name FROM Account").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SalesforceClient {
    http: reqwest::Client,
    instance: Url,
    api_version: String,
    access_token: String,
}

impl SalesforceClient {
    /// Exchange the connected-app credentials for an access token.
    ///
    /// Subsequent requests go to the `instance_url` returned with the token,
    /// falling back to the configured domain.
    pub async fn connect(http: reqwest::Client, credentials: Credentials) -> Result<Self> {
        let domain = Url::parse(&credentials.domain).or_raise(|| ErrorKind::Authentication)?;
        let token_url = domain.join("/services/oauth2/token").or_raise(|| ErrorKind::Authentication)?;
        let response = http
            .post(token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.consumer_key.as_str()),
                ("client_secret", credentials.consumer_secret.as_str()),
            ])
            .send()
            .await
            .or_raise(|| ErrorKind::Request)?;
        let token: TokenResponse = check_status(response)
            .await
            .or_raise(|| ErrorKind::Authentication)?
            .json()
            .await
            .or_raise(|| ErrorKind::Authentication)?;
        if token.access_token.is_empty() {
            exn::bail!(ErrorKind::Authentication);
        }
        let instance = match token.instance_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => Url::parse(url).or_raise(|| ErrorKind::Authentication)?,
            None => domain,
        };
        tracing::info!(instance = %instance, "Authenticated with Salesforce");
        Ok(Self::with_token(http, instance, credentials.api_version, token.access_token))
    }

    /// Build a client around an already issued access token.
    pub fn with_token(
        http: reqwest::Client,
        instance: Url,
        api_version: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            instance,
            api_version: api_version.into(),
            access_token: access_token.into(),
        }
    }

    /// The bearer token sent with every request.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    fn query_url(&self, soql: &str) -> Result<Url> {
        let mut url = self.resolve(&format!("/services/data/v{}/query", self.api_version))?;
        url.query_pairs_mut().append_pair("q", soql);
        Ok(url)
    }

    /// Resolve a server-relative path (locator or `nextRecordsUrl`) against
    /// the instance URL.
    fn resolve(&self, path: &str) -> Result<Url> {
        self.instance.join(path).or_raise(|| ErrorKind::Request)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        let response = self.http.get(url).bearer_auth(&self.access_token).send().await.or_raise(|| ErrorKind::Request)?;
        check_status(response).await
    }

    async fn fetch_page(&self, url: Url) -> Result<QueryPage> {
        self.get(url).await?.json().await.or_raise(|| ErrorKind::Decode)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), body = %body, "Salesforce rejected request");
    exn::bail!(ErrorKind::Status(status.as_u16()))
}

#[async_trait]
impl SourceClient for SalesforceClient {
    fn name(&self) -> &str {
        "salesforce"
    }

    fn query_stream<'a>(&'a self, soql: &'a str) -> RecordStream<'a> {
        Box::pin(stream! {
            let mut next = match self.query_url(soql) {
                Ok(url) => Some(url),
                Err(e) => {
                    yield Err(e);
                    return;
                },
            };
            while let Some(url) = next.take() {
                let QueryPage { done, next_records_url, records } = match self.fetch_page(url).await {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(e);
                        return;
                    },
                };
                tracing::debug!(records = records.len(), done, "Fetched Salesforce query page");
                for record in records {
                    yield Ok(record);
                }
                if let Some(path) = next_records_url.filter(|_| !done) {
                    match self.resolve(&path) {
                        Ok(url) => next = Some(url),
                        Err(e) => {
                            yield Err(e);
                            return;
                        },
                    }
                }
            }
        })
    }

    async fn download(&self, locator: &str) -> Result<Vec<u8>> {
        let url = self.resolve(locator)?;
        let bytes = self.get(url).await?.bytes().await.or_raise(|| ErrorKind::Request)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> SalesforceClient {
        let instance = Url::parse(&server.base_url()).unwrap();
        SalesforceClient::with_token(reqwest::Client::new(), instance, "58.0", "tok")
    }

    #[tokio::test]
    async fn test_connect_uses_instance_url() {
        let server = MockServer::start_async().await;
        let token = server
            .mock_async(|when, then| {
                when.method(POST).path("/services/oauth2/token");
                then.status(200).json_body(json!({
                    "access_token": "issued",
                    "instance_url": server.base_url(),
                    "token_type": "Bearer"
                }));
            })
            .await;
        let client = SalesforceClient::connect(
            reqwest::Client::new(),
            Credentials {
                domain: server.base_url(),
                consumer_key: "key".to_string(),
                consumer_secret: "secret".to_string(),
                api_version: DEFAULT_API_VERSION.to_string(),
            },
        )
        .await
        .unwrap();
        token.assert_async().await;
        assert_eq!(client.access_token(), "issued");
    }

    #[tokio::test]
    async fn test_connect_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/services/oauth2/token");
                then.status(400).json_body(json!({ "error": "invalid_client" }));
            })
            .await;
        let err = SalesforceClient::connect(
            reqwest::Client::new(),
            Credentials {
                domain: server.base_url(),
                consumer_key: "key".to_string(),
                consumer_secret: "wrong".to_string(),
                api_version: DEFAULT_API_VERSION.to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(*err, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_query_follows_next_records_url() {
        let server = MockServer::start_async().await;
        let first = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/services/data/v58.0/query")
                    .query_param("q", "SELECT Id FROM Account")
                    .header("authorization", "Bearer tok");
                then.status(200).json_body(json!({
                    "totalSize": 3,
                    "done": false,
                    "nextRecordsUrl": "/services/data/v58.0/query/01gNEXT-2000",
                    "records": [{ "Id": "001A" }, { "Id": "001B" }]
                }));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET).path("/services/data/v58.0/query/01gNEXT-2000");
                then.status(200).json_body(json!({
                    "totalSize": 3,
                    "done": true,
                    "records": [{ "Id": "001C" }]
                }));
            })
            .await;
        let client = client_for(&server);
        let records = client.query("SELECT Id FROM Account").await.unwrap();
        first.assert_async().await;
        second.assert_async().await;
        let ids: Vec<_> = records.iter().map(|r| r["Id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["001A", "001B", "001C"]);
    }

    #[tokio::test]
    async fn test_query_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/services/data/v58.0/query");
                then.status(400).json_body(json!([{ "errorCode": "INVALID_TYPE" }]));
            })
            .await;
        let err = client_for(&server).query("SELECT Id FROM Nope").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Status(400));
    }

    #[tokio::test]
    async fn test_query_as_rows() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/services/data/v58.0/query");
                then.status(200).json_body(json!({
                    "done": true,
                    "records": [{
                        "Id": "0681",
                        "Title": "Resume",
                        "VersionData": "/services/data/v58.0/sobjects/ContentVersion/0681/VersionData",
                        "FileExtension": "pdf"
                    }]
                }));
            })
            .await;
        let client = client_for(&server);
        let rows: Vec<crate::models::ContentVersionRow> =
            crate::query_as(&client, "SELECT Id, Title, VersionData, FileExtension FROM ContentVersion")
                .await
                .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Resume");
    }

    #[tokio::test]
    async fn test_download_sends_bearer_token() {
        let server = MockServer::start_async().await;
        let blob = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/services/data/v58.0/sobjects/ContentVersion/0681/VersionData")
                    .header("authorization", "Bearer tok");
                then.status(200).body("%PDF-1.7");
            })
            .await;
        let data = client_for(&server)
            .download("/services/data/v58.0/sobjects/ContentVersion/0681/VersionData")
            .await
            .unwrap();
        blob.assert_async().await;
        assert_eq!(data, b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_download_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;
        let err = client_for(&server).download("/missing").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Status(404));
    }
}
