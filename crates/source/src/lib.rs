//! Salesforce access for crosscloud.
//!
//! Provides the [`SourceClient`] capability (query rows, download blobs), a
//! REST implementation in [`SalesforceClient`], the row shapes crosscloud
//! selects in [`models`], and SOQL quoting helpers in [`soql`].

pub mod client;
pub mod error;
pub mod models;
pub mod soql;

#[cfg(feature = "mock")]
pub use crate::client::MockSource;
pub use crate::client::{Credentials, DEFAULT_API_VERSION, SalesforceClient, SourceClient, query_as};
use std::sync::Arc;

pub type SourceHandle = Arc<dyn SourceClient + Send + Sync>;
