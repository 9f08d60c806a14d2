use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a content block.
///
/// Blocks read from the store carry the id the store assigned. Blocks added
/// by an editor before the page is saved carry a local placeholder that the
/// store replaces on insertion. On the wire a number is a stored id and a
/// string is a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockId {
    Stored(i64),
    Local(String),
}

impl BlockId {
    pub fn stored(&self) -> Option<i64> {
        match self {
            BlockId::Stored(id) => Some(*id),
            BlockId::Local(_) => None,
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Stored(id) => write!(f, "{}", id),
            BlockId::Local(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for BlockId {
    fn from(id: i64) -> Self {
        BlockId::Stored(id)
    }
}

/// Kind of a content block. Fixed once the block is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Header,
    Paragraph,
    Image,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Paragraph => "paragraph",
            Self::Image => "image",
        }
    }

    /// Paragraphs and images count as page body.
    pub fn is_body(&self) -> bool {
        matches!(self, Self::Paragraph | Self::Image)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown block kind: {0}")]
pub struct UnknownBlockKind(pub String);

impl FromStr for BlockKind {
    type Err = UnknownBlockKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "header" => Ok(Self::Header),
            "paragraph" => Ok(Self::Paragraph),
            "image" => Ok(Self::Image),
            other => Err(UnknownBlockKind(other.to_string())),
        }
    }
}

/// One unit of page content.
///
/// For headers and paragraphs `text` is the body; for images it references
/// an image resource. `position` is the 1-based rank within the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub text: String,
    pub position: i32,
}

impl ContentBlock {
    pub fn new(id: BlockId, kind: BlockKind, text: impl Into<String>, position: i32) -> Self {
        Self {
            id,
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn stored(id: i64, kind: BlockKind, text: impl Into<String>, position: i32) -> Self {
        Self::new(BlockId::Stored(id), kind, text, position)
    }

    pub fn local(id: impl Into<String>, kind: BlockKind, text: impl Into<String>, position: i32) -> Self {
        Self::new(BlockId::Local(id.into()), kind, text, position)
    }
}
