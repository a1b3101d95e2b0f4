//! In-memory source client for testing.

use super::RecordStream;
use crate::SourceClient;
use crate::error::{ErrorKind, Result};
use async_stream::stream;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Query(String),
    Download(String),
}

/// In-memory source client for testing.
///
/// Queries are answered from canned rows keyed by the exact query string, so
/// tests build their expectations with the same query builders the code
/// under test uses. Unknown queries fail with
/// [`UnknownQuery`](ErrorKind::UnknownQuery) rather than returning nothing,
/// which keeps a typo from passing as "no results".
///
/// # Examples
///
/// ```
/// use crosscloud_source::{MockSource, SourceClient};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = MockSource::default()
///     .with_rows("SELECT Id FROM Account", [json!({ "Id": "001A" })])
///     .with_blob("/blob/1", b"hello".to_vec());
/// assert_eq!(source.query("SELECT Id FROM Account").await?.len(), 1);
/// assert_eq!(source.download("/blob/1").await?, b"hello");
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MockSource {
    rows: HashMap<String, Vec<Value>>,
    blobs: HashMap<String, Vec<u8>>,
    failing_queries: HashSet<String>,
    failing_downloads: HashSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl MockSource {
    /// Answer `soql` with `rows`.
    pub fn with_rows(mut self, soql: impl Into<String>, rows: impl IntoIterator<Item = Value>) -> Self {
        self.rows.insert(soql.into(), rows.into_iter().collect());
        self
    }

    /// Serve `data` for `locator`.
    pub fn with_blob(mut self, locator: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.blobs.insert(locator.into(), data.into());
        self
    }

    /// Make `soql` fail with an HTTP 500 status.
    pub fn with_failing_query(mut self, soql: impl Into<String>) -> Self {
        self.failing_queries.insert(soql.into());
        self
    }

    /// Make downloads of `locator` fail with an HTTP 500 status.
    pub fn with_failing_download(mut self, locator: impl Into<String>) -> Self {
        self.failing_downloads.insert(locator.into());
        self
    }

    /// Every locator downloaded so far, in order.
    pub async fn downloads(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                Call::Download(locator) => Some(locator.clone()),
                Call::Query(_) => None,
            })
            .collect()
    }

    /// Every query issued so far, in order.
    pub async fn queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                Call::Query(soql) => Some(soql.clone()),
                Call::Download(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl SourceClient for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn query_stream<'a>(&'a self, soql: &'a str) -> RecordStream<'a> {
        Box::pin(stream! {
            self.calls.lock().await.push(Call::Query(soql.to_string()));
            if self.failing_queries.contains(soql) {
                yield Err(exn::Exn::from(ErrorKind::Status(500)));
                return;
            }
            let Some(rows) = self.rows.get(soql) else {
                yield Err(exn::Exn::from(ErrorKind::UnknownQuery(soql.to_string())));
                return;
            };
            for row in rows {
                yield Ok(row.clone());
            }
        })
    }

    async fn download(&self, locator: &str) -> Result<Vec<u8>> {
        self.calls.lock().await.push(Call::Download(locator.to_string()));
        if self.failing_downloads.contains(locator) {
            exn::bail!(ErrorKind::Status(500));
        }
        self.blobs.get(locator).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(locator.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_canned_rows() {
        let source = MockSource::default().with_rows("SELECT Id FROM Account", [json!({"Id": "1"}), json!({"Id": "2"})]);
        let rows = source.query("SELECT Id FROM Account").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(source.queries().await, ["SELECT Id FROM Account"]);
    }

    #[tokio::test]
    async fn test_unknown_query() {
        let source = MockSource::default();
        let err = source.query("SELECT Id FROM Lead").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownQuery(_)));
    }

    #[tokio::test]
    async fn test_failing_query() {
        let source = MockSource::default().with_rows("q", []).with_failing_query("q");
        let err = source.query("q").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Status(500));
    }

    #[tokio::test]
    async fn test_download() {
        let source = MockSource::default().with_blob("/a", b"abc".to_vec()).with_failing_download("/b");
        assert_eq!(source.download("/a").await.unwrap(), b"abc");
        assert_eq!(*source.download("/b").await.unwrap_err(), ErrorKind::Status(500));
        assert!(matches!(&*source.download("/c").await.unwrap_err(), ErrorKind::NotFound(_)));
        assert_eq!(source.downloads().await, ["/a", "/b", "/c"]);
    }
}
