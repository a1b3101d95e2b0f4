//! Process bootstrap: build the clients and the migrator from configuration.

use crate::error::{ErrorKind, Result};
use crosscloud_config::{Config, DriveCredentials};
use crosscloud_destination::auth::{ServiceAccountKey, TokenSource};
use crosscloud_destination::{DestinationHandle, DriveClient};
use crosscloud_migrate::{FolderResolver, Migrator};
use crosscloud_source::{Credentials, SalesforceClient, SourceHandle};
use exn::ResultExt;
use std::path::Path;
use std::sync::Arc;

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).or_raise(|| ErrorKind::Config)
}

fn service_account_key(config: &Config) -> Result<ServiceAccountKey> {
    let key = match config.drive.credentials() {
        Some(DriveCredentials::File(path)) => ServiceAccountKey::from_file(path),
        Some(DriveCredentials::Json(json)) => ServiceAccountKey::from_json(json),
        None => exn::bail!(ErrorKind::Config),
    };
    key.or_raise(|| ErrorKind::DestinationConnect)
}

/// Connect to both systems and load the existing destination folders.
///
/// Fails if either system is unreachable or rejects the credentials.
pub async fn migrator(config: &Config) -> Result<Arc<Migrator>> {
    let http = reqwest::Client::builder()
        .timeout(config.migration.request_timeout())
        .build()
        .or_raise(|| ErrorKind::SourceConnect)?;

    let credentials = Credentials {
        domain: config.salesforce.domain.clone(),
        consumer_key: config.salesforce.consumer_key.clone(),
        consumer_secret: config.salesforce.consumer_secret.clone(),
        api_version: config.salesforce.api_version.clone(),
    };
    let source: SourceHandle =
        Arc::new(SalesforceClient::connect(http.clone(), credentials).await.or_raise(|| ErrorKind::SourceConnect)?);

    let tokens = TokenSource::service_account(service_account_key(config)?).or_raise(|| ErrorKind::DestinationConnect)?;
    let destination: DestinationHandle = Arc::new(DriveClient::new(http, tokens));
    let folders = FolderResolver::initialize(destination.clone()).await.or_raise(|| ErrorKind::DestinationConnect)?;

    tracing::info!(
        source = source.name(),
        destination = destination.name(),
        root_folder = %config.migration.root_folder,
        "Migrator ready"
    );
    let migrator = Migrator::new(source, destination, Arc::new(folders)).with_root_folder(&config.migration.root_folder);
    Ok(Arc::new(migrator))
}
