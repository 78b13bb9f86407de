//! Resource references inside a scenario document
//!
//! Every handout, ending text and map image in a scenario is referenced by a
//! path relative to the hosting environment. The engine never opens these
//! paths itself; it hands them to the host, which fetches text as plain text
//! and images as image resources.

use garde::Validate;
use serde::{Deserialize, Serialize};

/// A relative resource path resolved by the host
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate, derive_more::Display,
)]
#[serde(transparent)]
pub struct ResourcePath(
    #[garde(length(min = 1, max = crate::constants::scenario::MAX_PATH_LENGTH))] String,
);

impl ResourcePath {
    /// Wraps a path string
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A text handout shared by every player, such as the common information
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Handout {
    /// Path of the plain text file holding the handout
    #[garde(dive)]
    pub text_file: ResourcePath,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_resource_path_is_transparent() {
        let path: ResourcePath = serde_json::from_str(r#""texts/common.txt""#).unwrap();
        assert_eq!(path.as_str(), "texts/common.txt");
        assert_eq!(path.to_string(), "texts/common.txt");
        assert_eq!(serde_json::to_string(&path).unwrap(), r#""texts/common.txt""#);
    }

    #[test]
    fn test_empty_resource_path_is_invalid() {
        assert!(ResourcePath::new("").validate().is_err());
        assert!(ResourcePath::new("a.txt").validate().is_ok());
    }

    #[test]
    fn test_handout_uses_camel_case() {
        let handout: Handout = serde_json::from_str(r#"{"textFile":"common.txt"}"#).unwrap();
        assert_eq!(handout.text_file.as_str(), "common.txt");
    }
}
