//! Statement block kinds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The element names that carry a SQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl BlockKind {
    /// Every kind, in the order used for default configuration.
    pub const ALL: [BlockKind; 4] = [
        BlockKind::Select,
        BlockKind::Insert,
        BlockKind::Update,
        BlockKind::Delete,
    ];

    /// Lowercase element name.
    pub fn tag_name(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

impl FromStr for BlockKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownKind {
                name: name.to_string(),
            })
    }
}
