//! Destination models.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a destination folder.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<String> for FolderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
impl From<&str> for FolderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A folder returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
}

impl Folder {
    pub fn new(id: impl Into<FolderId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Access level granted on a folder.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    #[display("writer")]
    Writer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Writer => "writer",
        }
    }
}
