//! Resource labels used by land tiles, harbors and whitelists.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Terrain/resource label of a tile.
///
/// The label text (`WOOD`, `BRICK`, ...) is what appears in artifacts and in
/// JSON board definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
    /// No production. As a harbor this is the generic 3:1 harbor.
    Desert,
    Gold,
    Water,
}

impl Resource {
    /// All resource labels
    pub const ALL: [Resource; 8] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
        Resource::Desert,
        Resource::Gold,
        Resource::Water,
    ];

    /// Label text as written in artifacts
    pub fn label(&self) -> &'static str {
        match self {
            Resource::Wood => "WOOD",
            Resource::Brick => "BRICK",
            Resource::Sheep => "SHEEP",
            Resource::Wheat => "WHEAT",
            Resource::Ore => "ORE",
            Resource::Desert => "DESERT",
            Resource::Gold => "GOLD",
            Resource::Water => "WATER",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label text did not name a resource
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource label '{0}'")]
pub struct UnknownResource(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.label() == s)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse_roundtrip() {
        for r in Resource::ALL {
            assert_eq!(r.label().parse::<Resource>().unwrap(), r);
        }
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        assert!("wood".parse::<Resource>().is_err());
        assert_eq!(
            "CLAY".parse::<Resource>(),
            Err(UnknownResource("CLAY".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Resource::Wheat).unwrap();
        assert_eq!(json, "\"WHEAT\"");
        let back: Resource = serde_json::from_str("\"ORE\"").unwrap();
        assert_eq!(back, Resource::Ore);
    }
}
