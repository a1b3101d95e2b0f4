//! Source client trait and implementations.
//!
//! The [`SourceClient`] trait is the whole surface crosscloud needs from the
//! CRM: run a query and get rows back, and download a blob by its locator.

#[cfg(feature = "mock")]
mod mock;
mod salesforce;

#[cfg(feature = "mock")]
pub use self::mock::MockSource;
pub use self::salesforce::{Credentials, DEFAULT_API_VERSION, SalesforceClient};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use futures::{Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::pin::Pin;

pub(crate) type RecordStream<'a> = Pin<Box<dyn Stream<Item = Result<Value>> + Send + 'a>>;

/// Query and download capability of the source system.
///
/// Rows are returned as untyped JSON records so the trait stays object safe;
/// use [`query_as`] to deserialize them into one of the
/// [row models](crate::models).
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Name of the client (used for logging only).
    fn name(&self) -> &str;

    /// Run a query and collect every record across all result pages.
    ///
    /// Default implementation collects [`query_stream()`](Self::query_stream)
    /// into a [`Vec`].
    async fn query(&self, soql: &str) -> Result<Vec<Value>> {
        self.query_stream(soql).try_collect().await
    }

    /// Stream the records of a query, fetching further result pages as the
    /// stream is polled.
    ///
    /// The stream ends after yielding the first error.
    fn query_stream<'a>(&'a self, soql: &'a str) -> RecordStream<'a>;

    /// Download the binary content behind a locator (a `VersionData` URL path).
    ///
    /// The entire body is buffered in memory.
    async fn download(&self, locator: &str) -> Result<Vec<u8>>;
}

/// Run a query and deserialize every record into `T`.
///
/// Returns [`Decode`](ErrorKind::Decode) if any record does not match.
///
/// # Examples
///
/// ```no_run
/// use crosscloud_source::{SourceClient, query_as};
/// use crosscloud_source::models::ContentVersionRow;
/// # async fn example(client: &dyn SourceClient) -> crosscloud_source::error::Result<()> {
/// let rows: Vec<ContentVersionRow> =
///     query_as(client, "SELECT Id, Title, VersionData, FileExtension FROM ContentVersion").await?;
/// # Ok(())
/// # }
/// ```
pub async fn query_as<T: DeserializeOwned>(client: &dyn SourceClient, soql: &str) -> Result<Vec<T>> {
    client
        .query(soql)
        .await?
        .into_iter()
        .map(|record| serde_json::from_value(record).or_raise(|| ErrorKind::Decode))
        .collect()
}
