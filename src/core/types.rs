//! Core type definitions used throughout the codebase

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic random source owned by the game state
pub type GameRng = ChaCha8Rng;

/// Unique identifier for empires
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmpireId(pub u32);

impl EmpireId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EmpireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "empire#{}", self.0)
    }
}

/// Unique identifier for units (never reused within a game)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Unique identifier for settlements (never reused within a game)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SettlementId(pub u32);

impl std::fmt::Display for SettlementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "settlement#{}", self.0)
    }
}

/// Who issues orders for an empire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controller {
    Human,
    Ai,
}

/// Unordered pair of empires, normalized so `low < high`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmpirePair {
    low: EmpireId,
    high: EmpireId,
}

impl EmpirePair {
    /// Returns None for a pair of the same empire
    pub fn new(a: EmpireId, b: EmpireId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn contains(&self, id: EmpireId) -> bool {
        self.low == id || self.high == id
    }

    /// The member of the pair that is not `id`
    pub fn other(&self, id: EmpireId) -> Option<EmpireId> {
        if self.low == id {
            Some(self.high)
        } else if self.high == id {
            Some(self.low)
        } else {
            None
        }
    }

    pub fn members(&self) -> (EmpireId, EmpireId) {
        (self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_unordered() {
        let a = EmpireId(3);
        let b = EmpireId(1);
        assert_eq!(EmpirePair::new(a, b), EmpirePair::new(b, a));
    }

    #[test]
    fn test_pair_rejects_self() {
        assert!(EmpirePair::new(EmpireId(2), EmpireId(2)).is_none());
    }

    #[test]
    fn test_pair_other() {
        let pair = EmpirePair::new(EmpireId(0), EmpireId(4)).unwrap();
        assert_eq!(pair.other(EmpireId(0)), Some(EmpireId(4)));
        assert_eq!(pair.other(EmpireId(4)), Some(EmpireId(0)));
        assert_eq!(pair.other(EmpireId(9)), None);
        assert!(pair.contains(EmpireId(4)));
    }
}
