use serde::{Deserialize, Serialize};

/// An image resource that image blocks can reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub name: String,
    pub path: String,
}

/// Title shown when no site title has been stored yet.
pub const DEFAULT_SITE_TITLE: &str = "Quill";
