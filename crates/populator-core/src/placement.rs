use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog::{Category, ContentKind, OutputKind};
use crate::error::Error;

/// Fully resolved description of one file to be generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSpec {
    /// Directory plus file name. Unique within a run.
    pub target_path: PathBuf,
    pub output_kind: OutputKind,
    pub content_kind: ContentKind,
    pub category: Category,
}

impl PlacementSpec {
    pub fn file_name(&self) -> Option<&str> {
        self.target_path.file_name().and_then(|name| name.to_str())
    }
}

/// How many directory levels sit under the base path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Depth {
    /// `base/<category>/`
    Flat = 1,
    /// `base/<category>/<subdir>/`
    Nested = 2,
    /// `base/<category>/<subdir>/<year>/` for large sub-directories.
    Dated = 3,
}

impl Depth {
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Depth {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Depth::Flat),
            2 => Ok(Depth::Nested),
            3 => Ok(Depth::Dated),
            other => Err(Error::InvalidConfig(format!(
                "depth must be 1, 2 or 3 (got {other})"
            ))),
        }
    }
}

impl From<Depth> for u8 {
    fn from(depth: Depth) -> Self {
        depth.level()
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_rejects_out_of_range() {
        assert!(Depth::try_from(0).is_err());
        assert!(Depth::try_from(4).is_err());
        assert_eq!(Depth::try_from(3).unwrap(), Depth::Dated);
    }
}
