use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Pages reachable once a session is authorized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Generator,
    Docs,
}

impl Page {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generator => "generator",
            Self::Docs => "docs",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "generator" => Ok(Self::Generator),
            "docs" => Ok(Self::Docs),
            other => Err(ProtocolError::UnknownPage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_pages() {
        assert_eq!("generator".parse::<Page>().unwrap(), Page::Generator);
        assert_eq!(" docs ".parse::<Page>().unwrap(), Page::Docs);
    }

    #[test]
    fn rejects_unknown_page() {
        let err = "settings".parse::<Page>().unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownPage(ref p) if p == "settings"));
    }

    #[test]
    fn default_is_generator() {
        assert_eq!(Page::default(), Page::Generator);
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Page::Docs).unwrap(), "\"docs\"");
    }
}
