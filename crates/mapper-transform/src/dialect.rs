//! SQL dialect identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Name of a SQL dialect (`oracle`, `postgresql`, `mysql`, ...).
///
/// Stored lowercase; the set of names is open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dialect(String);

impl Dialect {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-case form used in prompts (`ORACLE`).
    pub fn display_name(&self) -> String {
        self.0.to_uppercase()
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(Error::InvalidDialect {
                name: s.to_string(),
            });
        }
        Ok(Self(name.to_lowercase()))
    }
}

impl TryFrom<String> for Dialect {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dialect> for String {
    fn from(dialect: Dialect) -> Self {
        dialect.0
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
