//! Migration engine for crosscloud.
//!
//! Reads the file catalog from a [`SourceClient`](crosscloud_source::SourceClient),
//! groups files by destination folder, resolves or creates those folders
//! through a shared [`FolderResolver`], and copies each file across with
//! [`Transfer`]. [`Migrator`] ties the pieces together.
//!
//! # Examples
//!
//! ```no_run
//! use crosscloud_migrate::{FolderResolver, Migrator};
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     source: crosscloud_source::SourceHandle,
//! #     destination: crosscloud_destination::DestinationHandle,
//! # ) -> crosscloud_migrate::error::Result<()> {
//! let folders = Arc::new(FolderResolver::initialize(destination.clone()).await?);
//! let migrator = Migrator::new(source, destination, folders);
//! let report = migrator.migrate_by_entity_type("Account", Some("user@example.com")).await?;
//! println!("{} files copied", report.transferred.len());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod folders;
pub mod models;
pub mod transfer;

pub use crate::catalog::Catalog;
pub use crate::coordinator::{DEFAULT_ROOT_FOLDER, Migrator};
pub use crate::folders::FolderResolver;
pub use crate::models::{FileRecord, Grouping, MigrationReport, SkippedLink, TransferredFile};
pub use crate::transfer::Transfer;
