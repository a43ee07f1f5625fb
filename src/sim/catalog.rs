//! Drop catalog
//!
//! The five drop kinds and their point values. Fixed for the process lifetime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Drop kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropKind {
    Blue,
    Orange,
    Green,
    Yellow,
    Rainbow,
}

impl DropKind {
    pub const ALL: [Self; 5] = [
        Self::Blue,
        Self::Orange,
        Self::Green,
        Self::Yellow,
        Self::Rainbow,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            DropKind::Blue => "blue",
            DropKind::Orange => "orange",
            DropKind::Green => "green",
            DropKind::Yellow => "yellow",
            DropKind::Rainbow => "rainbow",
        }
    }

    /// Score delta when collected
    pub fn points(&self) -> i32 {
        match self {
            DropKind::Blue => 2,
            DropKind::Orange => -3, // Hazard
            DropKind::Green => 1,
            DropKind::Yellow => 0, // Decoy
            DropKind::Rainbow => 5,
        }
    }

    /// Index into per-kind count arrays
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for DropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DropKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DropCatalog::lookup(s)
    }
}

/// Registry lookups by id
pub struct DropCatalog;

impl DropCatalog {
    /// Find a kind by its id
    pub fn lookup(id: &str) -> Result<DropKind, SimError> {
        DropKind::ALL
            .iter()
            .copied()
            .find(|k| k.id() == id)
            .ok_or_else(|| SimError::UnknownKind(id.to_string()))
    }

    /// All kinds in catalog order
    pub fn kinds() -> &'static [DropKind] {
        &DropKind::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known() {
        assert_eq!(DropCatalog::lookup("blue").unwrap(), DropKind::Blue);
        assert_eq!(DropCatalog::lookup("rainbow").unwrap().points(), 5);
        assert_eq!("orange".parse::<DropKind>().unwrap().points(), -3);
    }

    #[test]
    fn test_lookup_unknown() {
        let err = DropCatalog::lookup("purple").unwrap_err();
        assert!(matches!(err, SimError::UnknownKind(ref id) if id == "purple"));
        // Ids are case-sensitive
        assert!(DropCatalog::lookup("Blue").is_err());
    }

    #[test]
    fn test_point_values() {
        let points: Vec<i32> = DropCatalog::kinds().iter().map(|k| k.points()).collect();
        assert_eq!(points, vec![2, -3, 1, 0, 5]);
    }

    #[test]
    fn test_id_round_trip() {
        for kind in DropKind::ALL {
            assert_eq!(DropCatalog::lookup(kind.id()).unwrap(), kind);
            assert_eq!(kind.to_string(), kind.id());
        }
    }
}
